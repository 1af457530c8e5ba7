use serde::de::DeserializeOwned;

use crate::utils::error::ApiError;

/// Scans `text` for the first balanced `{...}` object, tracking string and
/// escape state so braces inside string literals don't confuse the depth
/// counter. LLM responses routinely wrap JSON in prose or markdown fences;
/// this extracts the payload without requiring the model to emit nothing
/// else.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = None;
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        let c = b as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

pub fn parse_structured_response<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let json_slice = extract_first_json_object(text)
        .ok_or_else(|| ApiError::LlmError("no JSON object found in llm response".into()))?;
    serde_json::from_str(json_slice)
        .map_err(|e| ApiError::LlmError(format!("malformed llm JSON response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let text = "Sure, here is the answer:\n```json\n{\"answer\": \"42\"}\n```\nHope that helps.";
        let extracted = extract_first_json_object(text).unwrap();
        assert_eq!(extracted, "{\"answer\": \"42\"}");
    }

    #[test]
    fn handles_braces_inside_string_values() {
        let text = r#"{"note": "a { nested brace }", "value": 1}"#;
        let extracted = extract_first_json_object(text).unwrap();
        assert_eq!(extracted, text);
    }

    #[test]
    fn returns_none_when_no_object_present() {
        assert!(extract_first_json_object("no json here").is_none());
    }
}
