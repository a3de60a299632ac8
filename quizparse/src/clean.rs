//! Raw-text preprocessing applied before any tier runs.
//!
//! Generative-model output arrives with invisible characters, inconsistent
//! Unicode composition, and markdown code fences around the payload. All
//! three break strict decoding or the pattern rules, so they are scrubbed
//! up front. Fence *markers* are removed but fenced content is kept, so the
//! heuristic tiers still see every line of the original text.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Characters that are invisible in rendered text but break pattern rules:
/// BOM, zero-width space/non-joiner/joiner, word joiner.
const INVISIBLE: [char; 5] = ['\u{FEFF}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}'];

/// Markdown fence markers with an optional language tag (```json, ``` ...).
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("invalid code fence pattern"));

/// Scrubs raw model output for the cascade.
pub(crate) fn preprocess(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !INVISIBLE.contains(c)).collect();

    let normalized = if is_nfc(&stripped) {
        stripped
    } else {
        stripped.nfc().collect()
    };

    if normalized.contains("```") {
        CODE_FENCE.replace_all(&normalized, "").into_owned()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_bom_and_zero_width() {
        let input = "\u{FEFF}{\"a\":\u{200B} 1}";
        assert_eq!(preprocess(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strips_fence_markers_keeps_content() {
        let input = "Here you go:\n```json\n{\"title\": \"Quiz\"}\n```\nEnjoy!";
        let cleaned = preprocess(input);
        assert!(cleaned.contains("{\"title\": \"Quiz\"}"));
        assert!(!cleaned.contains("```"));
        assert!(cleaned.contains("Enjoy!"));
    }

    #[test]
    fn test_plain_text_unchanged() {
        let input = "1. What is 2+2?\nA) 3\nB) 4";
        assert_eq!(preprocess(input), input);
    }

    #[test]
    fn test_nfc_normalization() {
        // 'e' followed by a combining acute accent composes to a single char.
        let decomposed = "caf\u{0065}\u{0301}";
        let cleaned = preprocess(decomposed);
        assert!(cleaned.ends_with('\u{00E9}'));
    }
}
