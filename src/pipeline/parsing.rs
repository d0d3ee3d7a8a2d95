//! Generator Output Parsing
//!
//! The generation capability returns free text; the structured shapes we ask
//! for (numbered lists, JSON arrays, sometimes fenced in markdown) come back
//! malformed often enough that this boundary is isolated here. Both parsers
//! are total functions: callers get an empty/None fallback, never an error.

use regex::Regex;
use std::sync::OnceLock;

/// Parse a numbered list: a line counts as an item when it starts with a
/// digit followed by `.`, `)` or `:`. Anything else is ignored.
pub fn numbered_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let bytes = line.as_bytes();
        if bytes.len() > 3 && bytes[0].is_ascii_digit() && matches!(bytes[1], b'.' | b')' | b':') {
            let item = line[2..].trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    items
}

fn fenced_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").expect("hardcoded pattern")
    })
}

/// Extract a JSON array from generator output. Tries a markdown code fence
/// first, then falls back to the outermost bracket pair.
pub fn extract_json_array(text: &str) -> Option<&str> {
    if let Some(caps) = fenced_array_re().captures(text) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_items_dot_paren_colon() {
        let text = "Here you go:\n1. First fix\n2) Second fix\n3: Third fix\n- not numbered";
        assert_eq!(
            numbered_items(text),
            vec!["First fix", "Second fix", "Third fix"]
        );
    }

    #[test]
    fn test_numbered_items_ignores_prose() {
        let text = "I would suggest improving the summary section.";
        assert!(numbered_items(text).is_empty());
    }

    #[test]
    fn test_numbered_items_skips_empty_bodies() {
        assert!(numbered_items("1.   \n2.\n").is_empty());
    }

    #[test]
    fn test_extract_json_array_from_fence() {
        let text = "Sure!\n```json\n[{\"skill\": \"Python\"}]\n```\nDone.";
        assert_eq!(extract_json_array(text), Some("[{\"skill\": \"Python\"}]"));
    }

    #[test]
    fn test_extract_json_array_bare() {
        let text = "The analysis: [1, 2, 3] as requested";
        assert_eq!(extract_json_array(text), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_extract_json_array_spans_lines() {
        let text = "[\n  {\"a\": 1},\n  {\"b\": [2]}\n]";
        let extracted = extract_json_array(text).unwrap();
        assert!(extracted.starts_with('['));
        assert!(extracted.ends_with(']'));
        assert!(serde_json::from_str::<serde_json::Value>(extracted).is_ok());
    }

    #[test]
    fn test_extract_json_array_none() {
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }
}
