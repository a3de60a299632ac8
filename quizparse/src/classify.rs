//! Question-kind inference from extracted fields.
//!
//! The rules form a fixed priority list; ties always resolve to the earliest
//! matching rule, so classification is deterministic for any input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::QuestionKind;

/// Prompt length above which an unoptioned question is treated as long-form.
pub const LONG_FORM_THRESHOLD: usize = 200;

/// Blank markers: a run of three or more underscores, or an ellipsis.
static BLANK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{3,}|\.{3}|…").expect("invalid blank marker pattern"));

/// Infers the semantic kind of a question from the shape of its fields.
///
/// Priority order:
/// 1. Any options → multiple choice, unless the options are exactly
///    True/False (case-insensitive) → true/false.
/// 2. No options, answer is "true"/"false" → true/false.
/// 3. No options, prompt contains a blank marker or the phrase
///    "fill in the blank" → fill-in-blank.
/// 4. No options, prompt longer than [`LONG_FORM_THRESHOLD`] chars or
///    containing "essay"/"discuss" → long answer.
/// 5. Otherwise → short answer.
///
/// # Examples
///
/// ```
/// use quizparse::classify::classify;
/// use quizparse::model::QuestionKind;
///
/// let kind = classify("The capital of France is ____.", &[], None);
/// assert_eq!(kind, QuestionKind::FillBlank);
/// ```
pub fn classify(text: &str, options: &[String], answer: Option<&str>) -> QuestionKind {
    if !options.is_empty() {
        if is_true_false(options) {
            return QuestionKind::TrueFalse;
        }
        return QuestionKind::MultipleChoice;
    }

    if let Some(answer) = answer {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("true") || answer.eq_ignore_ascii_case("false") {
            return QuestionKind::TrueFalse;
        }
    }

    let lower = text.to_lowercase();
    if BLANK_MARKER.is_match(text) || lower.contains("fill in the blank") {
        return QuestionKind::FillBlank;
    }

    if text.chars().count() > LONG_FORM_THRESHOLD
        || lower.contains("essay")
        || lower.contains("discuss")
    {
        return QuestionKind::LongAnswer;
    }

    QuestionKind::ShortAnswer
}

/// True when the option set is exactly {True, False}, in any order.
fn is_true_false(options: &[String]) -> bool {
    options.len() == 2
        && options.iter().any(|o| o.trim().eq_ignore_ascii_case("true"))
        && options
            .iter()
            .any(|o| o.trim().eq_ignore_ascii_case("false"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_options_mean_multiple_choice() {
        let kind = classify("What is 2+2?", &opts(&["3", "4", "5"]), Some("4"));
        assert_eq!(kind, QuestionKind::MultipleChoice);
    }

    #[test]
    fn test_true_false_options_override() {
        let kind = classify("The sky is blue.", &opts(&["true", "FALSE"]), None);
        assert_eq!(kind, QuestionKind::TrueFalse);
    }

    #[test]
    fn test_true_false_from_answer() {
        let kind = classify("Water boils at 100C at sea level.", &[], Some("True"));
        assert_eq!(kind, QuestionKind::TrueFalse);
    }

    #[test]
    fn test_blank_marker_underscores() {
        let kind = classify("The capital of France is ____.", &[], None);
        assert_eq!(kind, QuestionKind::FillBlank);
    }

    #[test]
    fn test_blank_marker_ellipsis() {
        assert_eq!(classify("2 + 2 = ...", &[], None), QuestionKind::FillBlank);
        assert_eq!(classify("2 + 2 = …", &[], None), QuestionKind::FillBlank);
    }

    #[test]
    fn test_fill_in_the_blank_phrase() {
        let kind = classify("Fill in the blank: H2O is", &[], None);
        assert_eq!(kind, QuestionKind::FillBlank);
    }

    #[test]
    fn test_long_text_means_long_answer() {
        let text = "x".repeat(LONG_FORM_THRESHOLD + 1);
        assert_eq!(classify(&text, &[], None), QuestionKind::LongAnswer);
    }

    #[test]
    fn test_essay_keyword() {
        let kind = classify("Write an essay on photosynthesis.", &[], None);
        assert_eq!(kind, QuestionKind::LongAnswer);
    }

    #[test]
    fn test_discuss_keyword() {
        let kind = classify("Discuss the water cycle.", &[], None);
        assert_eq!(kind, QuestionKind::LongAnswer);
    }

    #[test]
    fn test_blank_beats_length() {
        // Priority: the blank-marker rule fires before the long-form rule.
        let mut text = "y".repeat(LONG_FORM_THRESHOLD + 1);
        text.push_str(" ____");
        assert_eq!(classify(&text, &[], None), QuestionKind::FillBlank);
    }

    #[test]
    fn test_default_short_answer() {
        let kind = classify("Name the largest planet.", &[], None);
        assert_eq!(kind, QuestionKind::ShortAnswer);
    }
}
