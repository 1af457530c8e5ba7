use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::models::domain::MeetingId;
use crate::ocr::types::PositionedTextBlock;
use crate::providers::EmbeddingProvider;
use crate::state::AppState;
use crate::utils::error::ApiError;
use crate::vector::EmbeddedChunk;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub document_id: String,
    pub page_count: u32,
    pub chunks_indexed: usize,
    pub average_confidence: f32,
    pub text_blocks: Vec<PositionedTextBlock>,
}

/// Accepts a single-file multipart upload, runs it through the OCR pipeline,
/// chunks the recovered text, embeds each chunk, and upserts the result
/// into the meeting's vector collection. Mirrors the teacher's
/// `handlers/upload.rs` shape (multipart -> bytes -> process -> persist)
/// generalized for the OCR-backed ingestion path instead of direct text
/// extraction.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<MeetingId>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, ApiError> {
    let mut filename = String::from("document.pdf");
    let mut bytes: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidArgument(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("document.pdf").to_string();
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidArgument(format!("failed to read upload: {e}")))?,
            );
        }
    }

    let bytes = bytes.ok_or_else(|| ApiError::InvalidArgument("missing 'file' field".into()))?;
    let document_id = Uuid::new_v4().to_string();

    let result = state.ocr.process_document(&document_id, &bytes).await?;
    state
        .repository
        .create_document(&document_id, &meeting_id, &filename, Some(result.total_pages))
        .await?;

    if !result.success {
        state.repository.update_document_status(&document_id, "failed").await?;
        return Ok(Json(IngestResponse {
            success: false,
            message: result.message,
            document_id,
            page_count: 0,
            chunks_indexed: 0,
            average_confidence: 0.0,
            text_blocks: Vec::new(),
        }));
    }

    let chunks = state.chunker.chunk_blocks(&result.text_blocks);
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = state.embeddings.embed_batch(&texts).await?;

    let embedded: Vec<EmbeddedChunk> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| EmbeddedChunk {
            document_id: document_id.clone(),
            page_number: chunk.page_number,
            bbox: chunk.bbox,
            block_type: chunk.block_type,
            content: chunk.content,
            embedding,
        })
        .collect();

    let chunks_indexed = state.vector.upsert_blocks(&meeting_id, &embedded).await?;
    state.repository.update_document_status(&document_id, "ready").await?;

    Ok(Json(IngestResponse {
        success: true,
        message: result.message,
        document_id,
        page_count: result.total_pages,
        chunks_indexed,
        average_confidence: result.average_confidence,
        text_blocks: result.text_blocks,
    }))
}
