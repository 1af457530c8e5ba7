use text_splitter::{ChunkConfig, TextSplitter};

use crate::ocr::types::{BlockType, BoundingBox, PositionedTextBlock};

#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub page_number: Option<u32>,
    pub bbox: Option<BoundingBox>,
    pub block_type: Option<BlockType>,
}

/// Splits OCR output into retrieval-sized chunks along paragraph/sentence
/// boundaries rather than a fixed character window, inheriting the page
/// number and bounding box of whichever source block the chunk's text
/// starts in. Grounded on the teacher's `chunker.rs` overlap/window shape,
/// generalized to use `text-splitter`'s semantic boundaries instead of a
/// raw char stride.
pub struct TextChunker {
    min_chars: usize,
    max_chars: usize,
    overlap_chars: usize,
}

impl TextChunker {
    pub fn new(min_chars: usize, max_chars: usize, overlap_chars: usize) -> Self {
        Self { min_chars, max_chars, overlap_chars }
    }

    pub fn chunk_blocks(&self, blocks: &[PositionedTextBlock]) -> Vec<Chunk> {
        if blocks.is_empty() {
            return Vec::new();
        }

        let mut full_text = String::new();
        let mut offsets: Vec<(usize, u32, BoundingBox, BlockType)> = Vec::with_capacity(blocks.len());
        for block in blocks {
            offsets.push((full_text.len(), block.page_number, block.bbox, block.block_type));
            full_text.push_str(&block.text);
            full_text.push('\n');
        }

        let splitter = TextSplitter::new(ChunkConfig::new(self.min_chars..self.max_chars));
        let pieces: Vec<&str> = splitter.chunks(&full_text).collect();

        let mut chunks = Vec::with_capacity(pieces.len());
        let mut search_from = 0usize;
        let mut previous_tail: Option<String> = None;

        for piece in pieces {
            let start = full_text[search_from..]
                .find(piece)
                .map(|p| p + search_from)
                .unwrap_or(search_from);
            search_from = start + piece.len();

            let (page_number, bbox, block_type) = offsets
                .iter()
                .rev()
                .find(|(offset, _, _, _)| *offset <= start)
                .map(|(_, page, bbox, block_type)| (Some(*page), Some(*bbox), Some(*block_type)))
                .unwrap_or((None, None, None));

            let content = match previous_tail.take() {
                Some(tail) if !tail.is_empty() => format!("{tail}{piece}"),
                _ => piece.to_string(),
            };

            previous_tail = Some(tail_chars(piece, self.overlap_chars));
            chunks.push(Chunk { content, page_number, bbox, block_type });
        }

        chunks
    }
}

fn tail_chars(s: &str, n: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= n {
        return s.to_string();
    }
    s.chars().skip(char_count - n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(page: u32, text: &str) -> PositionedTextBlock {
        PositionedTextBlock {
            page_number: page,
            text: text.to_string(),
            bbox: BoundingBox::unknown(),
            confidence: 0.9,
            block_type: BlockType::Text,
        }
    }

    #[test]
    fn empty_blocks_produce_no_chunks() {
        let chunker = TextChunker::new(300, 800, 50);
        assert!(chunker.chunk_blocks(&[]).is_empty());
    }

    #[test]
    fn chunks_inherit_page_number() {
        let chunker = TextChunker::new(10, 40, 5);
        let blocks = vec![block(0, "The quick brown fox jumps over the lazy dog. ".repeat(3).as_str())];
        let chunks = chunker.chunk_blocks(&blocks);
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].page_number, Some(0));
    }
}
