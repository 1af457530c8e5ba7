pub mod embedding_service;
pub mod proofreading_service;
pub mod quiz_service;

pub use embedding_service::EmbeddingService;
pub use proofreading_service::ProofreadingService;
pub use quiz_service::QuizService;
