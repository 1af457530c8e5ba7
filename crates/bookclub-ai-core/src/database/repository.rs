use sqlx::PgPool;
use tracing::debug;

use super::models::{DocumentRecord, MeetingRecord};
use crate::models::domain::{DocumentId, MeetingId, MeetingType};
use crate::utils::error::ApiError;

/// Relational bookkeeping for meetings and ingested documents. Book chunks
/// themselves live in `VectorIndexManager`'s own tables — this repository
/// only tracks the metadata a meeting/document needs outside the vector
/// store (type, title, lifecycle status), the same split the teacher drew
/// between `rag_service.rs` (vector search) and its plain status tables.
pub struct Repository {
    pool: PgPool,
}

impl Repository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_meeting(
        &self,
        meeting_id: &MeetingId,
        meeting_type: MeetingType,
        title: &str,
    ) -> Result<MeetingRecord, ApiError> {
        let record: MeetingRecord = sqlx::query_as(
            r#"
            INSERT INTO meetings (meeting_id, meeting_type, title, status, created_at)
            VALUES ($1, $2, $3, 'active', now())
            RETURNING meeting_id, meeting_type, title, status, created_at, ended_at
            "#,
        )
        .bind(meeting_id)
        .bind(meeting_type.as_str())
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        debug!(%meeting_id, meeting_type = meeting_type.as_str(), "meeting created");
        Ok(record)
    }

    pub async fn get_meeting(&self, meeting_id: &MeetingId) -> Result<MeetingRecord, ApiError> {
        sqlx::query_as(
            "SELECT meeting_id, meeting_type, title, status, created_at, ended_at \
             FROM meetings WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("meeting {meeting_id} not found")))
    }

    pub async fn mark_meeting_ended(&self, meeting_id: &MeetingId) -> Result<(), ApiError> {
        sqlx::query("UPDATE meetings SET status = 'ended', ended_at = now() WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_meetings_by_status(&self, status: &str) -> Result<Vec<MeetingRecord>, ApiError> {
        let rows = sqlx::query_as(
            "SELECT meeting_id, meeting_type, title, status, created_at, ended_at \
             FROM meetings WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_document(
        &self,
        document_id: &DocumentId,
        meeting_id: &MeetingId,
        filename: &str,
        page_count: Option<u32>,
    ) -> Result<DocumentRecord, ApiError> {
        let record: DocumentRecord = sqlx::query_as(
            r#"
            INSERT INTO documents (document_id, meeting_id, filename, page_count, status, created_at)
            VALUES ($1, $2, $3, $4, 'processing', now())
            RETURNING document_id, meeting_id, filename, page_count, status, created_at
            "#,
        )
        .bind(document_id)
        .bind(meeting_id)
        .bind(filename)
        .bind(page_count.map(|p| p as i32))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn update_document_status(
        &self,
        document_id: &DocumentId,
        status: &str,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE documents SET status = $1 WHERE document_id = $2")
            .bind(status)
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_documents_for_meeting(
        &self,
        meeting_id: &MeetingId,
    ) -> Result<Vec<DocumentRecord>, ApiError> {
        let rows = sqlx::query_as(
            "SELECT document_id, meeting_id, filename, page_count, status, created_at \
             FROM documents WHERE meeting_id = $1 ORDER BY created_at ASC",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
