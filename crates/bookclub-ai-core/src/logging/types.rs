use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Activity type categories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    RequestReceived,
    MessageSent,
    RetrievalExecuted,
    RetrievalSkipped,
    TokenOverflow,
    SlidingWindowEnforced,
    LlmError,
    RetrievalError,
    SessionCreated,
    SessionExpired,
    CascadeDeletion,
    ProcessingStage,
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequestReceived => "request_received",
            Self::MessageSent => "message_sent",
            Self::RetrievalExecuted => "retrieval_executed",
            Self::RetrievalSkipped => "retrieval_skipped",
            Self::TokenOverflow => "token_overflow",
            Self::SlidingWindowEnforced => "sliding_window_enforced",
            Self::LlmError => "llm_error",
            Self::RetrievalError => "retrieval_error",
            Self::SessionCreated => "session_created",
            Self::SessionExpired => "session_expired",
            Self::CascadeDeletion => "cascade_deletion",
            Self::ProcessingStage => "processing_stage",
        }
    }
}

/// Activity status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
    Warning,
    Info,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Complete activity log entry. Session/meeting identifiers are strings in
/// this domain (not the teacher's numeric `user_id`/`document_id`), since
/// meetings and sessions are addressed by opaque string IDs throughout.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub session_id: Option<String>,
    pub meeting_id: Option<String>,
    pub participant_id: Option<String>,

    pub activity_type: ActivityType,
    pub activity_status: ActivityStatus,

    pub message_content: Option<String>,
    pub response_content: Option<String>,

    pub token_count: Option<i32>,
    pub retrieval_skipped: Option<bool>,
    pub similarity_score: Option<f32>,

    pub processing_time_ms: Option<i32>,
    pub llm_call_duration_ms: Option<i32>,
    pub retrieval_duration_ms: Option<i32>,

    pub error_message: Option<String>,
    pub error_type: Option<String>,

    pub created_at: DateTime<Utc>,

    pub custom_fields: Option<HashMap<String, serde_json::Value>>,
}

impl ActivityLog {
    pub fn builder(activity_type: ActivityType, status: ActivityStatus) -> ActivityLogBuilder {
        ActivityLogBuilder::new(activity_type, status)
    }
}

/// Builder pattern for `ActivityLog`, matching the teacher's fluent
/// construction style.
pub struct ActivityLogBuilder {
    log: ActivityLog,
}

impl ActivityLogBuilder {
    pub fn new(activity_type: ActivityType, status: ActivityStatus) -> Self {
        Self {
            log: ActivityLog {
                session_id: None,
                meeting_id: None,
                participant_id: None,
                activity_type,
                activity_status: status,
                message_content: None,
                response_content: None,
                token_count: None,
                retrieval_skipped: None,
                similarity_score: None,
                processing_time_ms: None,
                llm_call_duration_ms: None,
                retrieval_duration_ms: None,
                error_message: None,
                error_type: None,
                created_at: Utc::now(),
                custom_fields: None,
            },
        }
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.log.session_id = Some(id.into());
        self
    }

    pub fn meeting_id(mut self, id: impl Into<String>) -> Self {
        self.log.meeting_id = Some(id.into());
        self
    }

    pub fn participant_id(mut self, id: impl Into<String>) -> Self {
        self.log.participant_id = Some(id.into());
        self
    }

    pub fn message(mut self, content: impl Into<String>) -> Self {
        self.log.message_content = Some(content.into());
        self
    }

    pub fn response(mut self, content: impl Into<String>) -> Self {
        self.log.response_content = Some(content.into());
        self
    }

    pub fn token_count(mut self, count: i32) -> Self {
        self.log.token_count = Some(count);
        self
    }

    pub fn retrieval_skipped(mut self, skipped: bool) -> Self {
        self.log.retrieval_skipped = Some(skipped);
        self
    }

    pub fn similarity(mut self, score: f32) -> Self {
        self.log.similarity_score = Some(score);
        self
    }

    pub fn processing_time(mut self, ms: i32) -> Self {
        self.log.processing_time_ms = Some(ms);
        self
    }

    pub fn llm_duration(mut self, ms: i32) -> Self {
        self.log.llm_call_duration_ms = Some(ms);
        self
    }

    pub fn retrieval_duration(mut self, ms: i32) -> Self {
        self.log.retrieval_duration_ms = Some(ms);
        self
    }

    pub fn error(mut self, message: impl Into<String>, error_type: impl Into<String>) -> Self {
        self.log.error_message = Some(message.into());
        self.log.error_type = Some(error_type.into());
        self.log.activity_status = ActivityStatus::Error;
        self
    }

    pub fn custom_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.log
            .custom_fields
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> ActivityLog {
        self.log
    }
}
