pub mod cache;
pub mod context_builder;
pub mod manager;
pub mod session_store;
pub mod summarizer;
pub mod token_budget;
pub mod topic_analysis;
pub mod types;

pub use cache::SessionCache;
pub use context_builder::ContextBuilder;
pub use manager::DiscussionSessionEngine;
pub use session_store::RedisSessionStore;
pub use types::{DiscussionSession, DiscussionTurn};
