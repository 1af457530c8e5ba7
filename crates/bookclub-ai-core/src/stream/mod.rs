pub mod registry;

pub use registry::{StreamConnectionRegistry, StreamHandle, StreamSignal, StreamStatus};
