use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::Serialize;
use sqlx::{FromRow, PgPool, QueryBuilder};

use crate::models::domain::{BookChunk, DocumentId, MeetingId};
use crate::ocr::types::{BlockType, BoundingBox};
use crate::utils::error::ApiError;
use crate::utils::limiters::Limiters;

/// A book chunk with its embedding already computed, ready for insertion.
/// Keeping embedding computation out of this module mirrors the teacher's
/// split between `rag_service.rs` (storage/search) and `embedding_service.rs`
/// (the embedding call itself) — callers embed first, then upsert.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub document_id: DocumentId,
    pub page_number: Option<u32>,
    pub bbox: Option<BoundingBox>,
    pub block_type: Option<BlockType>,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Restricts a `query` call to a single document within the meeting's
/// collection, per the retrieval `filter?` contract.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub document_id: Option<DocumentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub meeting_id: MeetingId,
    pub chunk_count: i64,
    pub document_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct ChunkRow {
    chunk_id: i64,
    meeting_id: String,
    document_id: String,
    page_number: Option<i32>,
    bbox_x0: Option<f32>,
    bbox_y0: Option<f32>,
    bbox_x1: Option<f32>,
    bbox_y1: Option<f32>,
    block_type: Option<String>,
    content: String,
    similarity: f32,
}

/// Owns the per-meeting vector collection lifecycle. Each meeting's chunks
/// live in one shared table partitioned by `meeting_id` rather than one
/// physical Postgres table per meeting — simpler migrations, same isolation
/// guarantee since every query is scoped by `meeting_id`.
pub struct VectorIndexManager {
    pool: PgPool,
    limiters: std::sync::Arc<Limiters>,
}

impl VectorIndexManager {
    pub fn new(pool: PgPool, limiters: std::sync::Arc<Limiters>) -> Self {
        Self { pool, limiters }
    }

    /// Idempotent: records the meeting's collection as existing so later
    /// lookups and cleanup bookkeeping have a row to hang stats off of.
    pub async fn ensure_collection(&self, meeting_id: &MeetingId) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO meeting_collections (meeting_id, created_at)
            VALUES ($1, now())
            ON CONFLICT (meeting_id) DO NOTHING
            "#,
        )
        .bind(meeting_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_blocks(
        &self,
        meeting_id: &MeetingId,
        chunks: &[EmbeddedChunk],
    ) -> Result<usize, ApiError> {
        if chunks.is_empty() {
            return Ok(0);
        }
        self.ensure_collection(meeting_id).await?;

        let mut inserted = 0usize;
        for batch in chunks.chunks(200) {
            let (_permit, waited) = Limiters::acquire_timed(
                self.limiters.db_search.clone(),
                self.limiters.acquire_timeout,
                "db_search",
            )
            .await
            .map_err(|e| ApiError::Unavailable(e.to_string()))?;
            tracing::debug!(wait_ms = waited.as_millis(), op = "db_search", "wait_queue");

            let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                "INSERT INTO book_chunks \
                 (meeting_id, document_id, page_number, bbox_x0, bbox_y0, bbox_x1, bbox_y1, block_type, content, embedding) ",
            );
            qb.push_values(batch, |mut b, chunk| {
                b.push_bind(meeting_id)
                    .push_bind(&chunk.document_id)
                    .push_bind(chunk.page_number.map(|p| p as i32))
                    .push_bind(chunk.bbox.map(|bb| bb.x0))
                    .push_bind(chunk.bbox.map(|bb| bb.y0))
                    .push_bind(chunk.bbox.map(|bb| bb.x1))
                    .push_bind(chunk.bbox.map(|bb| bb.y1))
                    .push_bind(chunk.block_type.map(|bt| bt.as_str()))
                    .push_bind(&chunk.content)
                    .push_bind(Vector::from(chunk.embedding.clone()));
            });
            qb.build().execute(&self.pool).await?;
            inserted += batch.len();
        }

        Ok(inserted)
    }

    pub async fn query(
        &self,
        meeting_id: &MeetingId,
        query_embedding: &[f32],
        top_k: i64,
        filter: Option<&QueryFilter>,
    ) -> Result<Vec<BookChunk>, ApiError> {
        let (_permit, waited) = Limiters::acquire_timed(
            self.limiters.db_search.clone(),
            self.limiters.acquire_timeout,
            "db_search",
        )
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
        tracing::debug!(wait_ms = waited.as_millis(), op = "db_search", "wait_queue");

        let vector = Vector::from(query_embedding.to_vec());
        let document_filter = filter.and_then(|f| f.document_id.as_ref());

        let rows: Vec<ChunkRow> = sqlx::query_as(
            r#"
            SELECT chunk_id, meeting_id, document_id, page_number,
                   bbox_x0, bbox_y0, bbox_x1, bbox_y1, block_type, content,
                   1 - (embedding <=> $2) AS similarity
            FROM book_chunks
            WHERE meeting_id = $1
              AND ($4::text IS NULL OR document_id = $4)
            ORDER BY embedding <=> $2
            LIMIT $3
            "#,
        )
        .bind(meeting_id)
        .bind(vector)
        .bind(top_k)
        .bind(document_filter)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BookChunk {
                chunk_id: r.chunk_id,
                meeting_id: r.meeting_id,
                document_id: r.document_id,
                page_number: r.page_number.map(|p| p as u32),
                bbox: match (r.bbox_x0, r.bbox_y0, r.bbox_x1, r.bbox_y1) {
                    (Some(x0), Some(y0), Some(x1), Some(y1)) => Some(BoundingBox { x0, y0, x1, y1 }),
                    _ => None,
                },
                block_type: r.block_type.as_deref().map(BlockType::from),
                content: r.content,
                similarity: r.similarity,
            })
            .collect())
    }

    /// Drops every chunk belonging to this meeting. Safe to call more than
    /// once — a meeting with no chunks left simply affects zero rows.
    pub async fn drop_collection(&self, meeting_id: &MeetingId) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM book_chunks WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM meeting_collections WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_meeting_collections(&self) -> Result<Vec<MeetingId>, ApiError> {
        let ids: Vec<(String,)> =
            sqlx::query_as("SELECT meeting_id FROM meeting_collections ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn collection_info(&self, meeting_id: &MeetingId) -> Result<CollectionInfo, ApiError> {
        let created_at: Option<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT created_at FROM meeting_collections WHERE meeting_id = $1")
                .bind(meeting_id)
                .fetch_optional(&self.pool)
                .await?;

        let (chunk_count,): (i64,) =
            sqlx::query_as("SELECT count(*) FROM book_chunks WHERE meeting_id = $1")
                .bind(meeting_id)
                .fetch_one(&self.pool)
                .await?;
        let (document_count,): (i64,) = sqlx::query_as(
            "SELECT count(DISTINCT document_id) FROM book_chunks WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CollectionInfo {
            meeting_id: meeting_id.clone(),
            chunk_count,
            document_count,
            created_at: created_at.map(|(t,)| t),
        })
    }
}
