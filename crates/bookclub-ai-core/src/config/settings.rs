use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub rag: RagConfig,
    pub discussion: DiscussionConfig,
    pub limits: LimitsConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub pool_max_size: usize,
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    pub model: String,
    pub base_url: String,
    pub dimension: usize,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub stream_response: bool,
    pub tokenizer_kind: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrConfig {
    pub worker_url: String,
    pub max_document_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RagConfig {
    pub retrieval_top_k: usize,
    pub chunk_min_chars: usize,
    pub chunk_max_chars: usize,
    pub chunk_overlap_chars: usize,
    pub max_context_tokens: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscussionConfig {
    pub session_idle_timeout_seconds: u64,
    pub preserve_recent_messages: usize,
    pub topic_change_threshold: f32,
    pub comparison_window: usize,
    /// `windowSize` — max recent messages fed to context assembly.
    pub window_size: usize,
}

/// Concurrency caps and timeouts shared across the embedding, db-search,
/// and llm-call semaphores (`utils::limiters::Limiters`).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    pub embedding_concurrency: usize,
    pub db_search_concurrency: usize,
    pub llm_generate_concurrency: usize,
    pub llm_stream_concurrency: usize,
    pub acquire_timeout_ms: u64,
    pub embedding_batch_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub discussion_system_prompt: String,
    pub quiz_system_prompt: String,
    pub proofreading_system_prompt: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
