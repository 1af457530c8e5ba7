use std::sync::Arc;

use crate::config::Settings;
use crate::database::{DbPool, Repository};
use crate::discussion::DiscussionSessionEngine;
use crate::document::TextChunker;
use crate::logging::ActivityLogger;
use crate::meeting::MeetingLifecycleCoordinator;
use crate::ocr::OcrIngestPipeline;
use crate::providers::EmbeddingProvider;
use crate::services::{EmbeddingService, ProofreadingService, QuizService};
use crate::stream::StreamConnectionRegistry;
use crate::utils::limiters::Limiters;
use crate::vector::VectorIndexManager;

/// Application state shared across handlers. Every long-lived subsystem
/// built at startup in `main.rs` is handed out from here, the same flat
/// `Arc<...>`-field shape the teacher's `AppState` used.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub db_pool: DbPool,
    pub repository: Arc<Repository>,
    pub vector: Arc<VectorIndexManager>,
    pub chunker: Arc<TextChunker>,
    pub ocr: Arc<OcrIngestPipeline>,
    pub embeddings: Arc<EmbeddingService>,
    pub discussion: Arc<DiscussionSessionEngine>,
    pub meeting_coordinator: Arc<MeetingLifecycleCoordinator>,
    pub streams: Arc<StreamConnectionRegistry>,
    pub quiz: Arc<QuizService>,
    pub proofreading: Arc<ProofreadingService>,
    pub activity_logger: Arc<ActivityLogger>,
    pub limiters: Arc<Limiters>,
}

impl AppState {
    pub fn embedding_provider(&self) -> Arc<dyn EmbeddingProvider> {
        self.embeddings.clone()
    }
}
