pub mod collection;

pub use collection::{CollectionInfo, EmbeddedChunk, QueryFilter, VectorIndexManager};
