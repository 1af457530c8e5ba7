use serde::{Deserialize, Serialize};

use crate::models::domain::MeetingType;

/// Per-model character-to-token ratio profile. Kept distinct from the
/// teacher's `conversation/token_counter.rs` random-ratio placeholder —
/// this estimator is deterministic and dominant-script aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    Generic,
    OpenAi,
    Anthropic,
    Gemini,
}

struct Ratios {
    korean: f32,
    english: f32,
    mixed: f32,
}

impl TokenizerKind {
    fn ratios(self) -> Ratios {
        match self {
            TokenizerKind::Generic | TokenizerKind::OpenAi => Ratios { korean: 2.5, english: 4.0, mixed: 3.0 },
            TokenizerKind::Anthropic => Ratios { korean: 2.8, english: 4.2, mixed: 3.2 },
            TokenizerKind::Gemini => Ratios { korean: 2.2, english: 3.8, mixed: 2.8 },
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "openai" => TokenizerKind::OpenAi,
            "anthropic" => TokenizerKind::Anthropic,
            "gemini" => TokenizerKind::Gemini,
            _ => TokenizerKind::Generic,
        }
    }
}

fn dominant_script_ratio(text: &str, ratios: &Ratios) -> f32 {
    let hangul = text.chars().filter(|c| ('\u{AC00}'..='\u{D7A3}').contains(c)).count();
    let ascii_letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();

    if hangul == 0 && ascii_letters == 0 {
        return ratios.mixed;
    }
    if hangul > ascii_letters {
        ratios.korean
    } else if ascii_letters > hangul {
        ratios.english
    } else {
        ratios.mixed
    }
}

/// Estimates token count for a block of text: `ceil(chars / ratio)` plus a
/// 10% overhead (minimum 1 token), mirroring the original token-budgeting
/// service's estimator rather than the crude fixed-ratio placeholder this
/// module replaces.
pub fn estimate_tokens(text: &str, kind: TokenizerKind) -> usize {
    let char_count = text.chars().count();
    if char_count == 0 {
        return 0;
    }
    let ratio = dominant_script_ratio(text, &kind.ratios());
    let estimated = (char_count as f32 / ratio).ceil() as usize;
    let overhead = ((estimated as f32 * 0.1).floor() as usize).max(1);
    estimated + overhead
}

/// Fixed per-message structural overhead (role markers, separators) on top
/// of the nickname-prefix tokens, added to every turn's token accounting.
const MESSAGE_STRUCTURAL_OVERHEAD: usize = 3;

pub fn estimate_message_tokens(nickname: &str, content: &str, kind: TokenizerKind) -> usize {
    estimate_tokens(nickname, kind) + estimate_tokens(content, kind) + MESSAGE_STRUCTURAL_OVERHEAD
}

/// Proportional split of a token budget across context components, one
/// table per meeting type.
#[derive(Debug, Clone, Copy)]
pub struct BudgetSplit {
    pub messages: f32,
    pub book: f32,
    pub summary: f32,
    pub participants: f32,
    pub metadata: f32,
}

impl BudgetSplit {
    pub fn for_meeting_type(meeting_type: MeetingType) -> Self {
        match meeting_type {
            MeetingType::Discussion => Self { messages: 0.40, book: 0.35, summary: 0.15, participants: 0.05, metadata: 0.05 },
            MeetingType::Quiz => Self { messages: 0.20, book: 0.70, summary: 0.05, participants: 0.03, metadata: 0.02 },
            MeetingType::Proofreading => Self { messages: 0.50, book: 0.30, summary: 0.10, participants: 0.05, metadata: 0.05 },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TokenAllocation {
    pub messages: usize,
    pub book: usize,
    pub summary: usize,
    pub participants: usize,
    pub metadata: usize,
}

pub fn allocate_budget(total_budget: usize, meeting_type: MeetingType) -> TokenAllocation {
    let split = BudgetSplit::for_meeting_type(meeting_type);
    TokenAllocation {
        messages: (total_budget as f32 * split.messages) as usize,
        book: (total_budget as f32 * split.book) as usize,
        summary: (total_budget as f32 * split.summary) as usize,
        participants: (total_budget as f32 * split.participants) as usize,
        metadata: (total_budget as f32 * split.metadata) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_korean_text_with_the_korean_ratio() {
        let tokens = estimate_tokens("안녕하세요 반갑습니다", TokenizerKind::Generic);
        assert!(tokens > 0);
    }

    #[test]
    fn estimates_english_text_with_the_english_ratio() {
        let short = estimate_tokens("hello world", TokenizerKind::OpenAi);
        let long = estimate_tokens("hello world, this is a much longer sentence", TokenizerKind::OpenAi);
        assert!(long > short);
    }

    #[test]
    fn empty_text_has_zero_tokens() {
        assert_eq!(estimate_tokens("", TokenizerKind::Generic), 0);
    }

    #[test]
    fn discussion_budget_splits_as_documented() {
        let alloc = allocate_budget(10_000, MeetingType::Discussion);
        assert_eq!(alloc.messages, 4_000);
        assert_eq!(alloc.book, 3_500);
    }

    #[test]
    fn quiz_budget_favors_the_book() {
        let alloc = allocate_budget(10_000, MeetingType::Quiz);
        assert_eq!(alloc.book, 7_000);
    }
}
