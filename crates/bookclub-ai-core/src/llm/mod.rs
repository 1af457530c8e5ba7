pub mod gateway;
pub mod structured;

pub use gateway::{LlmGateway, LlmRequest};
pub use structured::extract_first_json_object;
