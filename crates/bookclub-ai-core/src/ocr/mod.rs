pub mod client;
pub mod ingest;
pub mod types;

pub use client::OcrClient;
pub use ingest::OcrIngestPipeline;
pub use types::{BlockType, BoundingBox, PositionedTextBlock, ProcessResult};
