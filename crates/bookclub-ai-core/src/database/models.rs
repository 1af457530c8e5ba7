use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::domain::{DocumentId, MeetingId, MeetingType};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MeetingRecord {
    pub meeting_id: MeetingId,
    pub meeting_type: String,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl MeetingRecord {
    pub fn parsed_meeting_type(&self) -> Option<MeetingType> {
        MeetingType::parse(&self.meeting_type)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentRecord {
    pub document_id: DocumentId,
    pub meeting_id: MeetingId,
    pub filename: String,
    pub page_count: Option<i32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
