use async_trait::async_trait;

use crate::utils::error::ApiError;

/// Seam between the discussion/meeting orchestration layer and whatever
/// embedding backend is configured. Implemented by `services::EmbeddingService`
/// (kept close to the teacher's original, `Limiters`-gated implementation).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
