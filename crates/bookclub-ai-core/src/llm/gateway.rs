use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::settings::LlmConfig;
use crate::utils::error::ApiError;
use crate::utils::limiters::Limiters;

#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Generalizes the teacher's `services/llm_service.rs` (which only exposes
/// a streaming `chat_stream`) to a single unary `complete` call, the shape
/// every module in this crate (discussion turns, quiz generation,
/// proofreading) actually needs. Falls back to a canned response when no
/// base URL is configured, so the rest of the system keeps working in a
/// local/offline dev setup.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, ApiError>;
}

pub struct LlmGateway {
    client: Client,
    config: LlmConfig,
    limiters: std::sync::Arc<Limiters>,
}

impl LlmGateway {
    pub fn new(config: LlmConfig, limiters: std::sync::Arc<Limiters>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("reqwest client builder should not fail with default config");
        Self { client, config, limiters }
    }

    fn mock_mode(&self) -> bool {
        self.config.base_url.trim().is_empty()
    }
}

#[async_trait]
impl LlmProvider for LlmGateway {
    async fn complete(&self, request: LlmRequest) -> Result<String, ApiError> {
        if self.mock_mode() {
            return Ok(format!(
                "[mock-llm] {}",
                request.user_prompt.chars().take(160).collect::<String>()
            ));
        }

        let (_permit, waited) = Limiters::acquire_timed(
            self.limiters.llm_generate.clone(),
            self.limiters.acquire_timeout,
            "llm_generate",
        )
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
        tracing::debug!(wait_ms = waited.as_millis(), op = "llm_generate", "wait_queue");

        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = ChatCompletionRequestBody {
            model: "default",
            messages: vec![
                ChatRequestMessage { role: "system", content: &request.system_prompt },
                ChatRequestMessage { role: "user", content: &request.user_prompt },
            ],
            max_tokens: request.max_tokens.min(self.config.max_tokens),
            stream: false,
        };

        let response = self.client.post(&url).json(&json!(body)).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::LlmError(format!("llm backend returned {}", response.status())));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::LlmError("llm backend returned no choices".into()))
    }
}
