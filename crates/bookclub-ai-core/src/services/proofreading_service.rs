use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm::gateway::{LlmProvider, LlmRequest};
use crate::llm::structured::parse_structured_response;
use crate::models::domain::MeetingId;
use crate::services::quiz_service::CleanupOutcome;
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub suggestion: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProofreadingPayload {
    corrected_text: String,
    corrections: Vec<Correction>,
    confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProofreadingResult {
    pub success: bool,
    pub corrected_text: String,
    pub corrections: Vec<Correction>,
    pub confidence: f32,
    /// Set only when `success == false`: the raw, unparsed LLM reply.
    pub raw_reply: Option<String>,
}

/// Reviews a participant-submitted passage for grammar/clarity issues.
/// Thin retrieve-free prompt/parse call-site (proofreading doesn't need
/// book-chunk retrieval); grounded on the same structured-response contract
/// as `QuizService`.
pub struct ProofreadingService {
    llm: Arc<dyn LlmProvider>,
}

impl ProofreadingService {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn review_passage(&self, passage: &str) -> Result<ProofreadingResult, ApiError> {
        if passage.trim().is_empty() {
            return Err(ApiError::InvalidArgument("passage is empty".into()));
        }

        let request = LlmRequest {
            system_prompt: "Proofread the passage below. Respond with JSON: \
                 {\"corrected_text\":...,\"corrections\":[{\"original\":...,\"suggestion\":...,\"reason\":...}],\
                 \"confidence\":0.0-1.0}"
                .to_string(),
            user_prompt: passage.to_string(),
            max_tokens: 800,
        };

        let raw = self.llm.complete(request).await?;
        match parse_structured_response::<ProofreadingPayload>(&raw) {
            Ok(parsed) => Ok(ProofreadingResult {
                success: true,
                corrected_text: parsed.corrected_text,
                corrections: parsed.corrections,
                confidence: parsed.confidence,
                raw_reply: None,
            }),
            Err(_) => Ok(ProofreadingResult {
                success: false,
                corrected_text: String::new(),
                corrections: Vec::new(),
                confidence: 0.0,
                raw_reply: Some(raw),
            }),
        }
    }

    pub async fn cleanup_meeting(&self, _meeting_id: &MeetingId) -> CleanupOutcome {
        CleanupOutcome { success: true, cleaned_count: 0 }
    }
}
