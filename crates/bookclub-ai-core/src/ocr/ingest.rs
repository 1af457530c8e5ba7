use crate::ocr::{OcrClient, PositionedTextBlock, ProcessResult};
use crate::utils::error::ApiError;

/// Accepts a book's PDF bytes (already assembled from an upload stream by the
/// handler), validates size, probes the page count locally, and forwards to
/// the remote OCR worker. Malformed or empty blocks from the worker are
/// substituted with a placeholder rather than failing the whole ingest.
pub struct OcrIngestPipeline {
    client: OcrClient,
    max_document_bytes: usize,
}

impl OcrIngestPipeline {
    pub fn new(client: OcrClient, max_document_bytes: usize) -> Self {
        Self { client, max_document_bytes }
    }

    pub async fn process_document(
        &self,
        document_id: &str,
        pdf_bytes: &[u8],
    ) -> Result<ProcessResult, ApiError> {
        if pdf_bytes.is_empty() {
            return Ok(ProcessResult::failed(document_id, "No PDF data received"));
        }
        if pdf_bytes.len() > self.max_document_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "document is {} bytes, exceeds the {} byte cap",
                pdf_bytes.len(),
                self.max_document_bytes
            )));
        }

        let page_count = Self::probe_page_count(pdf_bytes).unwrap_or(1);

        let mut blocks = self.client.process_pdf(document_id, pdf_bytes, page_count).await?;
        Self::sanitize_blocks(&mut blocks);

        if blocks.is_empty() {
            return Err(ApiError::Unavailable(
                "ocr worker returned no extractable text".into(),
            ));
        }

        Ok(ProcessResult::from_blocks(document_id, blocks))
    }

    fn probe_page_count(pdf_bytes: &[u8]) -> Option<u32> {
        lopdf::Document::load_mem(pdf_bytes)
            .ok()
            .map(|doc| doc.get_pages().len() as u32)
    }

    fn sanitize_blocks(blocks: &mut [PositionedTextBlock]) {
        for block in blocks.iter_mut() {
            if block.text.trim().is_empty() {
                tracing::warn!(page = block.page_number, "ocr worker returned an empty text block");
            }
            if !(0.0..=1.0).contains(&block.confidence) {
                block.confidence = block.confidence.clamp(0.0, 1.0);
            }
        }
    }
}
