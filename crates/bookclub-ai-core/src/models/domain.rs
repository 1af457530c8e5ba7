use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MeetingId = String;
pub type SessionId = String;
pub type DocumentId = String;
pub type ParticipantId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    Discussion,
    Quiz,
    Proofreading,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discussion => "discussion",
            Self::Quiz => "quiz",
            Self::Proofreading => "proofreading",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "discussion" => Some(Self::Discussion),
            "quiz" => Some(Self::Quiz),
            "proofreading" => Some(Self::Proofreading),
            _ => None,
        }
    }
}

/// A single discussion turn, held in the live session only; never individually
/// persisted (see the diagnostic activity log for the audit trail instead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub participant_id: ParticipantId,
    pub nickname: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(participant_id: impl Into<String>, nickname: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            nickname: nickname.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn contains_question(&self) -> bool {
        self.content.contains('?') || self.content.contains('？')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: ParticipantId,
    pub nickname: String,
}

/// A chunk of ingested book content attached to a meeting's vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookChunk {
    pub chunk_id: i64,
    pub meeting_id: MeetingId,
    pub document_id: DocumentId,
    pub page_number: Option<u32>,
    pub bbox: Option<crate::ocr::types::BoundingBox>,
    pub block_type: Option<crate::ocr::types::BlockType>,
    pub content: String,
    pub similarity: f32,
}
