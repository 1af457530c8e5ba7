use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{ChatMessage, MeetingId, Participant, SessionId};

/// Live state for one discussion session, mirrored between the Redis store
/// (source of truth) and the local read-through cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionSession {
    pub session_id: SessionId,
    pub meeting_id: MeetingId,
    pub participants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
    pub last_summary: Option<String>,
    pub current_topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl DiscussionSession {
    pub fn new(session_id: SessionId, meeting_id: MeetingId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            meeting_id,
            participants: Vec::new(),
            messages: Vec::new(),
            last_summary: None,
            current_topics: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.touch();
    }
}

/// One produced moderator turn, returned to the caller as the result of
/// `DiscussionSessionEngine::post_message`.
#[derive(Debug, Clone, Serialize)]
pub struct DiscussionTurn {
    pub session_id: SessionId,
    pub response: String,
    pub topics: Vec<String>,
    pub topic_changed: bool,
    pub context_truncated: bool,
    pub book_chunks_used: usize,
}
