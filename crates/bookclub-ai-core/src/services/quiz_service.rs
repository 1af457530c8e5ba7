use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm::gateway::{LlmProvider, LlmRequest};
use crate::llm::structured::parse_structured_response;
use crate::models::domain::MeetingId;
use crate::providers::EmbeddingProvider;
use crate::utils::error::ApiError;
use crate::vector::VectorIndexManager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuizResponse {
    questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupOutcome {
    pub success: bool,
    pub cleaned_count: usize,
}

/// Retrieve → prompt → parse call-site for quiz generation: fetches the
/// meeting's highest-relevance book chunks for a topic, asks the LLM
/// gateway for a structured multiple-choice set, and tolerantly extracts
/// the JSON payload via `llm::structured`. Grounded on the teacher's
/// `rag_service.rs` retrieval call shape; no quiz-generation body logic
/// existed in the retrieved original source, so the prompt/parse contract
/// here follows spec §4.6 directly.
pub struct QuizService {
    vector: Arc<VectorIndexManager>,
    embeddings: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl QuizService {
    pub fn new(vector: Arc<VectorIndexManager>, embeddings: Arc<dyn EmbeddingProvider>, llm: Arc<dyn LlmProvider>) -> Self {
        Self { vector, embeddings, llm }
    }

    pub async fn generate_quiz(
        &self,
        meeting_id: &MeetingId,
        topic_hint: &str,
        question_count: usize,
    ) -> Result<Vec<QuizQuestion>, ApiError> {
        let embedding = self.embeddings.embed(topic_hint).await?;
        let chunks = self.vector.query(meeting_id, &embedding, 8, None).await?;
        if chunks.is_empty() {
            return Err(ApiError::InvalidArgument("meeting has no ingested book content yet".into()));
        }

        let passages = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n");

        let request = LlmRequest {
            system_prompt: format!(
                "Generate exactly {question_count} multiple-choice quiz questions from the passages below. \
                 Respond with JSON: {{\"questions\":[{{\"question\":...,\"options\":[4 strings],\
                 \"correct_answer\":0-3,\"explanation\":...}}]}}"
            ),
            user_prompt: passages,
            max_tokens: 1200,
        };

        let raw = self.llm.complete(request).await?;
        let parsed: QuizResponse = parse_structured_response(&raw)?;
        for q in &parsed.questions {
            if q.options.len() != 4 {
                return Err(ApiError::LlmError(format!(
                    "quiz question has {} options, expected exactly 4",
                    q.options.len()
                )));
            }
            if q.correct_answer > 3 {
                return Err(ApiError::LlmError(format!(
                    "quiz question correct_answer {} out of bounds 0..3",
                    q.correct_answer
                )));
            }
        }
        Ok(parsed.questions)
    }

    /// Missing or inapplicable cleanup is a no-op success, never a cascade
    /// failure — matches the resolved quiz/proofreading cleanup question.
    pub async fn cleanup_meeting(&self, _meeting_id: &MeetingId) -> CleanupOutcome {
        CleanupOutcome { success: true, cleaned_count: 0 }
    }
}
