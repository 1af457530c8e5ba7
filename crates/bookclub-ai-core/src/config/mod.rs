pub mod settings;

pub use settings::{
    DatabaseConfig, DiscussionConfig, EmbeddingConfig, LimitsConfig, LlmConfig, OcrConfig,
    PromptsConfig, RagConfig, RedisConfig, ServerConfig, Settings,
};
