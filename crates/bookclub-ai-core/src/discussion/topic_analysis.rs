use std::collections::HashSet;

use crate::models::domain::ChatMessage;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "to", "of", "in", "on", "and", "or", "but",
    "이", "그", "저", "의", "가", "을", "를", "은", "는", "이다", "있다", "하다", "것", "수", "등",
];

/// Frequency-based topic extraction over a window of recent messages:
/// lowercase, strip stop words, rank remaining tokens by raw occurrence
/// frequency, return the top N.
pub fn extract_topics(messages: &[ChatMessage], top_n: usize) -> Vec<String> {
    use std::collections::HashMap;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for message in messages {
        for term in tokenize(&message.content) {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(top_n).map(|(term, _)| term).collect()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TopicChange {
    pub topic_changed: bool,
    pub confidence: f32,
}

/// Compares topic sets from two adjacent windows of the conversation via
/// Jaccard similarity; below `threshold` similarity counts as a topic
/// change. Too little history to form two full windows yields a
/// zero-confidence "no change" verdict rather than a false positive.
pub fn detect_topic_change(
    messages: &[ChatMessage],
    comparison_window: usize,
    threshold: f32,
) -> TopicChange {
    if messages.len() < comparison_window * 2 {
        return TopicChange { topic_changed: false, confidence: 0.0 };
    }

    let split = messages.len() - comparison_window;
    let previous_window = &messages[split - comparison_window..split];
    let current_window = &messages[split..];

    let previous_topics: HashSet<String> = extract_topics(previous_window, 10).into_iter().collect();
    let current_topics: HashSet<String> = extract_topics(current_window, 10).into_iter().collect();

    let similarity = jaccard_similarity(&previous_topics, &current_topics);
    TopicChange {
        topic_changed: similarity < threshold,
        confidence: 1.0 - similarity,
    }
}

fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str) -> ChatMessage {
        ChatMessage::new("p1", "reader", content)
    }

    #[test]
    fn extracts_repeated_terms_as_topics() {
        let messages = vec![
            msg("the ending of the book was surprising"),
            msg("I agree, the ending really surprised me"),
        ];
        let topics = extract_topics(&messages, 5);
        assert!(topics.contains(&"ending".to_string()));
    }

    #[test]
    fn too_little_history_reports_no_change_with_zero_confidence() {
        let messages = vec![msg("hello"), msg("world")];
        let result = detect_topic_change(&messages, 3, 0.3);
        assert!(!result.topic_changed);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn identical_windows_report_no_topic_change() {
        let messages: Vec<ChatMessage> = (0..6).map(|_| msg("the plot twist at the end was great")).collect();
        let result = detect_topic_change(&messages, 3, 0.3);
        assert!(!result.topic_changed);
    }
}
