use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::discussion::manager::DiscussionSessionEngine;
use crate::models::domain::{MeetingId, MeetingType, SessionId};
use crate::services::proofreading_service::ProofreadingService;
use crate::services::quiz_service::{CleanupOutcome, QuizService};
use crate::stream::StreamConnectionRegistry;
use crate::utils::error::ApiError;
use crate::vector::VectorIndexManager;

/// Delay before the vector collection is actually dropped after a meeting
/// ends, giving any in-flight quiz/proofreading request a grace window to
/// finish reading from it. Mirrors the original cleanup service's deferred
/// delete.
const VECTOR_CLEANUP_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
pub struct MeetingStatus {
    pub meeting_id: MeetingId,
    pub active_discussion_sessions: usize,
    pub book_chunk_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndMeetingReport {
    pub meeting_id: MeetingId,
    pub discussion_sessions_closed: usize,
    pub quiz_cleanup: CleanupOutcome,
    pub proofreading_cleanup: CleanupOutcome,
    pub vector_cleanup_scheduled: bool,
}

/// Fans an `end_meeting` request out to every subsystem that holds
/// per-meeting state: closes live discussion sessions, runs the (no-op
/// tolerant) quiz/proofreading cleanup hooks, disconnects live streams, and
/// schedules a delayed vector-collection drop. Grounded on the original
/// `meeting_service.py` cascade order and `vector_db_cleanup_service.py`'s
/// deferred, retryable delete.
pub struct MeetingLifecycleCoordinator {
    discussion: Arc<DiscussionSessionEngine>,
    vector: Arc<VectorIndexManager>,
    streams: Arc<StreamConnectionRegistry>,
    quiz: Arc<QuizService>,
    proofreading: Arc<ProofreadingService>,
}

impl MeetingLifecycleCoordinator {
    pub fn new(
        discussion: Arc<DiscussionSessionEngine>,
        vector: Arc<VectorIndexManager>,
        streams: Arc<StreamConnectionRegistry>,
        quiz: Arc<QuizService>,
        proofreading: Arc<ProofreadingService>,
    ) -> Self {
        Self { discussion, vector, streams, quiz, proofreading }
    }

    /// Validates `meeting_type` against the supported set and, for
    /// `discussion`, requires `session_id` (the spec's `extras.sessionId`)
    /// and closes only that session rather than every active one.
    pub async fn end_meeting(
        &self,
        meeting_id: &MeetingId,
        meeting_type: MeetingType,
        session_id: Option<&SessionId>,
    ) -> Result<EndMeetingReport, ApiError> {
        let mut closed = 0usize;
        if meeting_type == MeetingType::Discussion {
            let session_id = session_id.ok_or_else(|| {
                ApiError::InvalidArgument("discussion meetings require extras.sessionId to end".into())
            })?;
            self.streams.disconnect_session(session_id, "meeting ended");
            if let Err(err) = self.discussion.end_discussion(session_id, meeting_id).await {
                tracing::warn!(%session_id, error = %err, "failed to close discussion session during meeting end");
            } else {
                closed = 1;
            }
        }

        let quiz_cleanup = self.quiz.cleanup_meeting(meeting_id).await;
        let proofreading_cleanup = self.proofreading.cleanup_meeting(meeting_id).await;

        self.schedule_vector_cleanup(meeting_id.clone());

        Ok(EndMeetingReport {
            meeting_id: meeting_id.clone(),
            discussion_sessions_closed: closed,
            quiz_cleanup,
            proofreading_cleanup,
            vector_cleanup_scheduled: true,
        })
    }

    /// Drops the vector collection immediately, bypassing the delay —
    /// used for an operator-triggered manual cleanup rather than the
    /// normal end-of-meeting cascade.
    pub async fn manual_cleanup(&self, meeting_id: &MeetingId) -> Result<CleanupOutcome, ApiError> {
        let removed = self.vector.drop_collection(meeting_id).await?;
        Ok(CleanupOutcome { success: true, cleaned_count: removed as usize })
    }

    pub async fn get_meeting_status(&self, meeting_id: &MeetingId) -> Result<MeetingStatus, ApiError> {
        let sessions = self.discussion.active_sessions(meeting_id).await.unwrap_or_default();
        let info = self.vector.collection_info(meeting_id).await?;
        Ok(MeetingStatus {
            meeting_id: meeting_id.clone(),
            active_discussion_sessions: sessions.len(),
            book_chunk_count: info.chunk_count,
        })
    }

    pub async fn list_active_meetings(&self) -> Result<Vec<MeetingId>, ApiError> {
        self.vector.list_meeting_collections().await
    }

    fn schedule_vector_cleanup(&self, meeting_id: MeetingId) {
        let vector = self.vector.clone();
        tokio::spawn(async move {
            tokio::time::sleep(VECTOR_CLEANUP_DELAY).await;
            if let Err(err) = vector.drop_collection(&meeting_id).await {
                tracing::warn!(%meeting_id, error = %err, "delayed vector collection cleanup failed");
            }
        });
    }
}
