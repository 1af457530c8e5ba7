use std::time::Duration;

use reqwest::Client;

use crate::ocr::types::{OcrWorkerBlock, OcrWorkerResponse};
use crate::ocr::{BlockType, BoundingBox, PositionedTextBlock};
use crate::utils::error::ApiError;

const CHUNK_SIZE: usize = 2 * 1024 * 1024; // 2 MiB, matches the worker's streaming upload contract
const BASE_TIMEOUT_SECS: u64 = 30;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_SECS: u64 = 2;

/// Talks to the external, remote OCR worker over HTTP. The worker is treated
/// as an opaque network dependency (per the resolved transport question) —
/// this client only knows how to stream bytes to it and retry on failure.
#[derive(Clone)]
pub struct OcrClient {
    http: Client,
    worker_url: String,
}

impl OcrClient {
    pub fn new(worker_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .build()
            .expect("reqwest client builder should not fail with default config");
        Self { http, worker_url: worker_url.into() }
    }

    fn dynamic_timeout(page_count: u32) -> Duration {
        let base = BASE_TIMEOUT_SECS;
        let scaled = (page_count as u64) * 5;
        Duration::from_secs(base.max(scaled))
    }

    /// Streams `pdf_bytes` to the OCR worker in 2 MiB chunks, retrying the
    /// whole request on transient failure with linearly increasing timeout
    /// and backoff, mirroring the worker's retry contract.
    pub async fn process_pdf(
        &self,
        document_id: &str,
        pdf_bytes: &[u8],
        page_count: u32,
    ) -> Result<Vec<PositionedTextBlock>, ApiError> {
        let dynamic_timeout = Self::dynamic_timeout(page_count);

        let mut last_err: Option<ApiError> = None;
        for attempt in 0..MAX_ATTEMPTS {
            let current_timeout = dynamic_timeout + Duration::from_secs((attempt as u64) * 10);

            match self.try_process_once(document_id, pdf_bytes, current_timeout).await {
                Ok(blocks) => return Ok(blocks),
                Err(err) => {
                    tracing::warn!(
                        document_id,
                        attempt,
                        error = %err,
                        "ocr worker attempt failed"
                    );
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        let wait = Duration::from_secs(RETRY_DELAY_SECS * (attempt as u64 + 1));
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ApiError::Unavailable("ocr worker exhausted retries".into())))
    }

    async fn try_process_once(
        &self,
        document_id: &str,
        pdf_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<PositionedTextBlock>, ApiError> {
        let url = format!("{}/v1/ocr/documents/{document_id}", self.worker_url);

        let body_stream = futures::stream::iter(
            pdf_bytes
                .chunks(CHUNK_SIZE)
                .map(|chunk| Ok::<_, std::io::Error>(bytes::Bytes::copy_from_slice(chunk)))
                .collect::<Vec<_>>(),
        );

        let response = tokio::time::timeout(
            timeout,
            self.http
                .post(&url)
                .header("content-type", "application/pdf")
                .body(reqwest::Body::wrap_stream(body_stream))
                .send(),
        )
        .await
        .map_err(|_| ApiError::Timeout(format!("ocr worker timed out after {:?}", timeout)))??;

        if !response.status().is_success() {
            return Err(ApiError::Unavailable(format!(
                "ocr worker returned status {}",
                response.status()
            )));
        }

        let parsed: OcrWorkerResponse = response.json().await?;
        Ok(parsed.blocks.into_iter().map(Self::map_block).collect())
    }

    fn map_block(raw: OcrWorkerBlock) -> PositionedTextBlock {
        let bbox = raw
            .bbox
            .map(|[x0, y0, x1, y1]| BoundingBox { x0, y0, x1, y1 })
            .unwrap_or_else(BoundingBox::unknown);
        let block_type = raw.block_type.as_deref().map(BlockType::from).unwrap_or_default();
        PositionedTextBlock {
            page_number: raw.page_number,
            text: raw.text,
            bbox,
            confidence: raw.confidence.unwrap_or(0.0),
            block_type,
        }
    }
}
