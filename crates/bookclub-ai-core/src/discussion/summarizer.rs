use std::sync::Arc;

use crate::llm::gateway::{LlmProvider, LlmRequest};
use crate::models::domain::ChatMessage;

/// Rough token budget for the `extractive` strategy's greedy message fill.
const SUMMARY_TOKEN_BUDGET: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    Extractive,
    Abstractive,
    Template,
    Hybrid,
}

/// Produces a compact summary of a run of discussion messages, used both for
/// the session's rolling `lastSummary` and as the replacement text when the
/// context optimizer drops an aging prefix of the conversation.
pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn summarize(
        &self,
        messages: &[ChatMessage],
        topics: &[String],
        strategy: SummaryStrategy,
    ) -> String {
        match strategy {
            SummaryStrategy::Extractive => Self::extractive(messages, topics),
            SummaryStrategy::Template => Self::template(messages, topics),
            SummaryStrategy::Abstractive => self.abstractive(messages).await.unwrap_or_else(|| Self::template(messages, topics)),
            SummaryStrategy::Hybrid => {
                if let Some(summary) = self.abstractive(messages).await {
                    summary
                } else {
                    Self::extractive(messages, topics)
                }
            }
        }
    }

    /// Ranks each message by `length_factor + question_bonus + topic_hits*0.3
    /// + position_bonus`, greedily fills a token budget (`len(content)/4`)
    /// highest-score-first, then restores chronological order.
    fn extractive(messages: &[ChatMessage], topics: &[String]) -> String {
        if messages.is_empty() {
            return String::new();
        }

        let mut scored: Vec<(usize, f32)> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| (i, Self::extractive_score(m, topics, i, messages.len())))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut kept: Vec<usize> = Vec::new();
        let mut used_tokens = 0usize;
        for (i, _) in &scored {
            let estimated_tokens = messages[*i].content.chars().count() / 4;
            if !kept.is_empty() && used_tokens + estimated_tokens > SUMMARY_TOKEN_BUDGET {
                continue;
            }
            kept.push(*i);
            used_tokens += estimated_tokens;
        }
        kept.sort_unstable();

        kept.into_iter()
            .map(|i| messages[i].content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn extractive_score(message: &ChatMessage, topics: &[String], index: usize, total: usize) -> f32 {
        let raw_length_factor = (message.content.chars().count() as f32 / 50.0).min(1.0);
        let length_factor = if raw_length_factor > 0.5 { raw_length_factor } else { 0.0 };
        let question_bonus = if message.contains_question() { 0.5 } else { 0.0 };
        let lowered = message.content.to_lowercase();
        let topic_hits = topics.iter().filter(|t| lowered.contains(t.as_str())).count() as f32;
        let position_bonus = if index == 0 || index + 1 == total { 0.3 } else { 0.0 };

        length_factor + question_bonus + topic_hits * 0.3 + position_bonus
    }

    fn template(messages: &[ChatMessage], topics: &[String]) -> String {
        let topic_list = if topics.is_empty() {
            "several points".to_string()
        } else {
            topics.join(", ")
        };
        format!(
            "The group discussed {topic_list} across {count} messages.",
            count = messages.len()
        )
    }

    async fn abstractive(&self, messages: &[ChatMessage]) -> Option<String> {
        if messages.is_empty() {
            return None;
        }
        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.nickname, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let request = LlmRequest {
            system_prompt: "Summarize this book club discussion transcript in two or three sentences.".into(),
            user_prompt: transcript,
            max_tokens: 200,
        };

        self.llm.complete(request).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str) -> ChatMessage {
        ChatMessage::new("p1", "reader", content)
    }

    #[test]
    fn template_mentions_message_count() {
        let messages = vec![msg("a"), msg("b")];
        let summary = Summarizer::template(&messages, &["ending".to_string()]);
        assert!(summary.contains("2 messages"));
        assert!(summary.contains("ending"));
    }

    #[test]
    fn extractive_keeps_at_least_one_message() {
        let messages = vec![msg("short")];
        let summary = Summarizer::extractive(&messages, &[]);
        assert_eq!(summary, "short");
    }

    #[test]
    fn extractive_favors_questions() {
        let messages = vec![
            msg("a plain statement with no particular weight"),
            msg("what did everyone think about the ending?"),
        ];
        let score_plain = Summarizer::extractive_score(&messages[0], &[], 0, 2);
        let score_question = Summarizer::extractive_score(&messages[1], &[], 1, 2);
        assert!(score_question > score_plain);
    }
}
