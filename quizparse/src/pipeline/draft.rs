//! Intermediate buffers produced by the tiers before assembly.
//!
//! A draft is a question or evaluation as the raw text described it — fields
//! may be missing, letters may have gaps, numbers may be out of range. The
//! normalizer and validator turn drafts into contract-satisfying records.

use crate::model::QuestionKind;

/// Options as a tier recovered them.
///
/// Heuristic tiers see lettered markers and collect `(letter, text)` pairs
/// that still need dense alignment; strict decoding yields a list that is
/// already ordered and only needs cleanup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DraftOptions {
    Lettered(Vec<(char, String)>),
    Ordered(Vec<String>),
}

impl Default for DraftOptions {
    fn default() -> Self {
        DraftOptions::Lettered(Vec::new())
    }
}

impl DraftOptions {
    pub fn is_empty(&self) -> bool {
        match self {
            DraftOptions::Lettered(pairs) => pairs.is_empty(),
            DraftOptions::Ordered(list) => list.is_empty(),
        }
    }

    /// Appends a lettered option. No-op for ordered lists, which only the
    /// decode tier produces and never extends.
    pub fn push_letter(&mut self, letter: char, text: String) {
        if let DraftOptions::Lettered(pairs) = self {
            pairs.push((letter, text));
        }
    }

    /// Mutable access to the text of the most recent lettered option, for
    /// continuation lines.
    pub fn last_text_mut(&mut self) -> Option<&mut String> {
        match self {
            DraftOptions::Lettered(pairs) => pairs.last_mut().map(|(_, text)| text),
            DraftOptions::Ordered(list) => list.last_mut(),
        }
    }
}

/// A question reconstructed from raw text, before classification,
/// alignment, and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DraftQuestion {
    /// Prompt text accumulated so far. May be empty.
    pub text: String,
    /// Options as the producing tier saw them.
    pub options: DraftOptions,
    /// Raw answer value, label already stripped.
    pub answer: Option<String>,
    /// Raw explanation text, label already stripped.
    pub explanation: Option<String>,
}

impl DraftQuestion {
    /// True when nothing at all was recovered into this draft.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.options.is_empty()
            && self.answer.is_none()
            && self.explanation.is_none()
    }
}

/// Quiz-level metadata recovered alongside the questions.
#[derive(Debug, Clone, Default)]
pub(crate) struct QuizMeta {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    /// Kind the document declared for the whole quiz, if recognizable.
    pub declared_kind: Option<QuestionKind>,
}

/// Criterion-level material recovered from rubric-shaped output
/// (grading results, feedback, essay evaluations).
#[derive(Debug, Clone, Default)]
pub(crate) struct DraftEvaluation {
    /// Raw per-criterion scores in the order they were seen.
    pub scores: Vec<(String, f64)>,
    /// Raw per-criterion feedback.
    pub criterion_feedback: Vec<(String, String)>,
    pub overall_feedback: Option<String>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub suggestions: Vec<String>,
    pub suggested_points: Option<f64>,
    pub total_score: Option<f64>,
    pub max_score: Option<f64>,
}

impl DraftEvaluation {
    /// Raw score for `name`, matched case-insensitively. Last wins.
    pub fn score_for(&self, name: &str) -> Option<f64> {
        self.scores
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, s)| *s)
    }

    /// Raw feedback for `name`, matched case-insensitively. Last wins.
    pub fn feedback_for(&self, name: &str) -> Option<&str> {
        self.criterion_feedback
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, f)| f.as_str())
    }
}
