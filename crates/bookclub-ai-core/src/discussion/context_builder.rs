use std::fmt::Write as _;
use std::sync::Arc;

use crate::discussion::summarizer::{SummaryStrategy, Summarizer};
use crate::discussion::token_budget::{allocate_budget, estimate_tokens, TokenizerKind};
use crate::models::domain::{BookChunk, ChatMessage, MeetingType, Participant};

pub struct BuiltContext {
    pub text: String,
    pub truncated: bool,
    pub book_chunks_used: usize,
    /// The synthesized/carried summary fragment alone (no XML framing) —
    /// what callers should persist as `last_summary`, never `text`.
    pub summary: Option<String>,
}

/// Assembles the system context handed to the LLM gateway for one
/// discussion turn (or quiz/proofreading generation), applying the
/// teacher's XML-tagged document/chunk framing (`rag_service.rs` /
/// `manager.rs::build_structured_rag_context`) generalized with the
/// optimization ladder: drop low-ranked chunks, then old messages,
/// synthesizing a summary for what was dropped, falling back to an
/// aggressive single-chunk/single-message reduction if the budget still
/// can't fit.
pub struct ContextBuilder {
    summarizer: Arc<Summarizer>,
    tokenizer: TokenizerKind,
}

impl ContextBuilder {
    pub fn new(summarizer: Arc<Summarizer>, tokenizer: TokenizerKind) -> Self {
        Self { summarizer, tokenizer }
    }

    pub async fn build(
        &self,
        meeting_type: MeetingType,
        book_chunks: &[BookChunk],
        messages: &[ChatMessage],
        carried_summary: Option<&str>,
        participants: &[Participant],
        total_token_budget: usize,
        preserve_recent: usize,
    ) -> BuiltContext {
        let allocation = allocate_budget(total_token_budget, meeting_type);

        let mut chunks: Vec<&BookChunk> = book_chunks.iter().collect();
        while chunks.len() > 1 && estimate_tokens(&render_chunks(&chunks), self.tokenizer) > allocation.book {
            chunks.pop();
        }

        let mut kept_messages: Vec<&ChatMessage> = messages.iter().collect();
        let mut dropped_prefix: Vec<ChatMessage> = Vec::new();
        while kept_messages.len() > preserve_recent
            && estimate_tokens(&render_messages(&kept_messages), self.tokenizer) > allocation.messages
        {
            dropped_prefix.push((*kept_messages.remove(0)).clone());
        }

        let mut summary_text = carried_summary.unwrap_or_default().to_string();
        if !dropped_prefix.is_empty() {
            let topics = crate::discussion::topic_analysis::extract_topics(&dropped_prefix, 5);
            let synthesized = self.summarizer.summarize(&dropped_prefix, &topics, SummaryStrategy::Hybrid).await;
            summary_text = if summary_text.is_empty() {
                synthesized
            } else {
                format!("{summary_text} {synthesized}")
            };
        }

        let mut truncated = !dropped_prefix.is_empty() || chunks.len() < book_chunks.len();
        let summary = if summary_text.is_empty() { None } else { Some(summary_text.clone()) };

        let mut text = render_full(&chunks, &kept_messages, &summary_text, participants);

        if estimate_tokens(&text, self.tokenizer) > total_token_budget {
            // Aggressive reduction: one chunk, one message, no participant roster.
            let single_chunk: Vec<&BookChunk> = chunks.first().copied().into_iter().collect();
            let single_message: Vec<&ChatMessage> = kept_messages.last().copied().into_iter().collect();
            text = render_full(&single_chunk, &single_message, &summary_text, &[]);
            truncated = true;

            return BuiltContext { text, truncated, book_chunks_used: single_chunk.len(), summary };
        }

        BuiltContext { text, truncated, book_chunks_used: chunks.len(), summary }
    }
}

fn render_chunks(chunks: &[&BookChunk]) -> String {
    let mut buf = String::with_capacity(chunks.len() * 256);
    for chunk in chunks {
        let _ = write!(
            buf,
            "<chunk document=\"{}\" page=\"{}\" similarity=\"{:.3}\">{}</chunk>\n",
            chunk.document_id,
            chunk.page_number.map(|p| p.to_string()).unwrap_or_else(|| "?".into()),
            chunk.similarity,
            chunk.content
        );
    }
    buf
}

fn render_messages(messages: &[&ChatMessage]) -> String {
    let mut buf = String::with_capacity(messages.len() * 128);
    for message in messages {
        let _ = write!(buf, "<message from=\"{}\">{}</message>\n", message.nickname, message.content);
    }
    buf
}

fn render_full(
    chunks: &[&BookChunk],
    messages: &[&ChatMessage],
    summary: &str,
    participants: &[Participant],
) -> String {
    let mut buf = String::new();
    if !summary.is_empty() {
        let _ = write!(buf, "<summary>{summary}</summary>\n");
    }
    if !participants.is_empty() {
        let names: Vec<&str> = participants.iter().map(|p| p.nickname.as_str()).collect();
        let _ = write!(buf, "<participants>{}</participants>\n", names.join(", "));
    }
    if !chunks.is_empty() {
        let _ = write!(buf, "<book>\n{}</book>\n", render_chunks(chunks));
    }
    if !messages.is_empty() {
        let _ = write!(buf, "<transcript>\n{}</transcript>\n", render_messages(messages));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, similarity: f32) -> BookChunk {
        BookChunk {
            chunk_id: 1,
            meeting_id: "meeting-1".into(),
            document_id: id.into(),
            page_number: Some(1),
            bbox: None,
            block_type: None,
            content: "text".repeat(50),
            similarity,
        }
    }

    #[test]
    fn renders_chunks_in_given_order() {
        let a = chunk("doc-a", 0.9);
        let rendered = render_chunks(&[&a]);
        assert!(rendered.contains("doc-a"));
    }
}
