use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Text,
    Image,
    Table,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Table => "table",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Placeholder box substituted when the OCR worker returns a block with
    /// no usable geometry; keeps downstream chunking from branching on `Option`.
    pub fn unknown() -> Self {
        Self { x0: 0.0, y0: 0.0, x1: 1.0, y1: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionedTextBlock {
    pub page_number: u32,
    pub text: String,
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub block_type: BlockType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub success: bool,
    pub message: String,
    pub document_id: String,
    pub full_text: String,
    pub page_texts: Vec<String>,
    pub text_blocks: Vec<PositionedTextBlock>,
    pub total_pages: u32,
    pub average_confidence: f32,
}

impl ProcessResult {
    pub fn from_blocks(document_id: impl Into<String>, blocks: Vec<PositionedTextBlock>) -> Self {
        let total_pages = blocks.iter().map(|b| b.page_number).max().unwrap_or(0) + if blocks.is_empty() { 0 } else { 1 };
        let mut page_texts: Vec<String> = vec![String::new(); total_pages as usize];
        for b in &blocks {
            if let Some(slot) = page_texts.get_mut(b.page_number as usize) {
                if !slot.is_empty() {
                    slot.push('\n');
                }
                slot.push_str(&b.text);
            }
        }
        let full_text = page_texts.join("\n\n");
        let average_confidence = if blocks.is_empty() {
            0.0
        } else {
            blocks.iter().map(|b| b.confidence).sum::<f32>() / blocks.len() as f32
        };
        Self {
            success: true,
            message: "ok".to_string(),
            document_id: document_id.into(),
            full_text,
            page_texts,
            text_blocks: blocks,
            total_pages,
            average_confidence,
        }
    }

    /// A structured, non-throwing failure result — e.g. an empty upload.
    pub fn failed(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            document_id: document_id.into(),
            full_text: String::new(),
            page_texts: Vec::new(),
            text_blocks: Vec::new(),
            total_pages: 0,
            average_confidence: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OcrWorkerRequest<'a> {
    pub document_id: &'a str,
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OcrWorkerBlock {
    pub page_number: u32,
    pub text: String,
    pub bbox: Option<[f32; 4]>,
    pub confidence: Option<f32>,
    pub block_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OcrWorkerResponse {
    pub blocks: Vec<OcrWorkerBlock>,
}

impl From<&str> for BlockType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "table" => BlockType::Table,
            "figure" | "image" => BlockType::Image,
            _ => BlockType::Text,
        }
    }
}
