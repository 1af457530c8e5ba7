use std::sync::Arc;

use crate::config::settings::{DiscussionConfig, RagConfig};
use crate::discussion::cache::SessionCache;
use crate::discussion::context_builder::ContextBuilder;
use crate::discussion::session_store::RedisSessionStore;
use crate::discussion::token_budget::{estimate_message_tokens, TokenizerKind};
use crate::discussion::topic_analysis::detect_topic_change;
use crate::discussion::types::{DiscussionSession, DiscussionTurn};
use crate::llm::gateway::{LlmProvider, LlmRequest};
use crate::logging::{ActivityLogger, ActivityStatus, ActivityType};
use crate::logging::types::ActivityLogBuilder;
use crate::models::domain::{ChatMessage, MeetingId, MeetingType, Participant, SessionId};
use crate::providers::EmbeddingProvider;
use crate::utils::error::ApiError;
use crate::vector::VectorIndexManager;

/// Orchestrates one discussion turn: session lookup, book-chunk retrieval,
/// context assembly, LLM call, persistence. Structurally grounded on the
/// teacher's `conversation/manager.rs::handle_message` (session lookup →
/// retrieval → context → llm → persist), restructured around this crate's
/// `start`/`post_message`/`end` operations rather than that file's
/// streaming/citation-verification loop, which has no counterpart here.
pub struct DiscussionSessionEngine {
    cache: Arc<SessionCache>,
    store: Arc<RedisSessionStore>,
    vector: Arc<VectorIndexManager>,
    embeddings: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    context_builder: Arc<ContextBuilder>,
    activity_logger: Arc<ActivityLogger>,
    config: DiscussionConfig,
    rag: RagConfig,
    tokenizer: TokenizerKind,
    base_instruction: String,
}

impl DiscussionSessionEngine {
    pub fn new(
        cache: Arc<SessionCache>,
        store: Arc<RedisSessionStore>,
        vector: Arc<VectorIndexManager>,
        embeddings: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        context_builder: Arc<ContextBuilder>,
        activity_logger: Arc<ActivityLogger>,
        config: DiscussionConfig,
        rag: RagConfig,
        tokenizer: TokenizerKind,
        base_instruction: String,
    ) -> Self {
        Self { cache, store, vector, embeddings, llm, context_builder, activity_logger, config, rag, tokenizer, base_instruction }
    }

    pub async fn active_sessions(&self, meeting_id: &MeetingId) -> Result<Vec<SessionId>, ApiError> {
        self.store.active_sessions(meeting_id).await
    }

    pub async fn cleanup_expired_sessions(&self, meeting_id: &MeetingId) -> Result<usize, ApiError> {
        self.store.cleanup_expired_sessions(meeting_id).await
    }

    pub async fn start_discussion(
        &self,
        session_id: SessionId,
        meeting_id: MeetingId,
        participants: Vec<Participant>,
    ) -> Result<DiscussionSession, ApiError> {
        let mut session = DiscussionSession::new(session_id, meeting_id);
        session.participants = participants;
        self.cache.save(&session).await?;
        Ok(session)
    }

    pub async fn post_message(
        &self,
        session_id: &SessionId,
        participant_id: &str,
        nickname: &str,
        content: &str,
    ) -> Result<DiscussionTurn, ApiError> {
        let mut session = self
            .cache
            .get(session_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("discussion session {session_id}")))?;

        session.push_message(ChatMessage::new(participant_id, nickname, content));

        let topic_change = detect_topic_change(&session.messages, self.config.comparison_window, self.config.topic_change_threshold);
        if topic_change.topic_changed {
            session.current_topics = crate::discussion::topic_analysis::extract_topics(&session.messages, 5);
        }

        let query_embedding = self.embeddings.embed(content).await?;
        let chunks = self
            .vector
            .query(&session.meeting_id, &query_embedding, self.rag.retrieval_top_k as i64, None)
            .await?;

        let window_start = session.messages.len().saturating_sub(self.config.window_size.max(1));
        let windowed_messages = &session.messages[window_start..];

        let built = self
            .context_builder
            .build(
                MeetingType::Discussion,
                &chunks,
                windowed_messages,
                session.last_summary.as_deref(),
                &session.participants,
                self.rag.max_context_tokens,
                self.config.preserve_recent_messages,
            )
            .await;

        let request = LlmRequest {
            system_prompt: format!("{}\n\n{}", self.base_instruction, built.text),
            user_prompt: content.to_string(),
            max_tokens: 800,
        };

        let response = self.llm.complete(request).await?;

        session.push_message(ChatMessage::new("moderator", "Moderator", &response));
        session.last_summary = built.summary.clone();
        self.cache.save(&session).await?;

        let message_tokens = estimate_message_tokens(nickname, content, self.tokenizer);
        self.activity_logger.log(
            ActivityLogBuilder::new(ActivityType::MessageSent, ActivityStatus::Success)
                .session_id(session_id.clone())
                .custom_field("message_tokens", message_tokens.to_string())
                .custom_field("book_chunks_used", built.book_chunks_used.to_string())
                .custom_field("context_truncated", built.truncated.to_string())
                .build(),
        );

        Ok(DiscussionTurn {
            session_id: session_id.clone(),
            response,
            topics: session.current_topics.clone(),
            topic_changed: topic_change.topic_changed,
            context_truncated: built.truncated,
            book_chunks_used: built.book_chunks_used,
        })
    }

    /// No-op-tolerant: a store delete failure is logged but never fails the
    /// broader meeting-end cascade (per the resolved cleanup open question).
    pub async fn end_discussion(&self, session_id: &SessionId, meeting_id: &MeetingId) -> Result<(), ApiError> {
        self.cache.invalidate(session_id);
        if let Err(err) = self.cache.store_delete(session_id, meeting_id).await {
            tracing::warn!(%session_id, error = %err, "failed to delete discussion session from store");
        }
        Ok(())
    }
}
