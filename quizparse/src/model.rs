//! Output records produced by the extraction pipeline.
//!
//! Every type here is fully normalized when it leaves the pipeline: no field
//! is ever absent, every numeric value is within its documented bound, and
//! collections that the contract requires to be non-empty are non-empty.
//! All records are JSON-serializable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which decoding contract applies to a raw generative-model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Quiz,
    Feedback,
    GradingResult,
    EssayEvaluation,
}

/// An opaque generative-model response paired with its expected content kind.
///
/// Produced by the upstream model call, consumed once by [`crate::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// The unstructured text exactly as the model returned it.
    pub text: String,
    /// Which decoding contract to apply.
    pub kind: ContentKind,
}

impl RawResponse {
    /// Creates a new raw response.
    #[inline]
    pub fn new(text: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Semantic type of a question, inferred from the shape of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
    LongAnswer,
}

impl QuestionKind {
    /// Stable snake_case name, matching the serialized tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::FillBlank => "fill_blank",
            QuestionKind::ShortAnswer => "short_answer",
            QuestionKind::LongAnswer => "long_answer",
        }
    }

    /// Parses a declared type string from a decoded document.
    ///
    /// Generative models spell the same kind a dozen ways ("multiple-choice",
    /// "multipleChoice", "MCQ", ...), so matching happens on the lowercased
    /// alphanumeric skeleton of the input.
    pub fn from_declared(raw: &str) -> Option<Self> {
        let skeleton: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match skeleton.as_str() {
            "multiplechoice" | "mcq" | "choice" => Some(QuestionKind::MultipleChoice),
            "truefalse" | "tf" | "boolean" => Some(QuestionKind::TrueFalse),
            "fillblank" | "fillintheblank" | "fillintheblanks" | "blank" => {
                Some(QuestionKind::FillBlank)
            }
            "shortanswer" | "short" => Some(QuestionKind::ShortAnswer),
            "longanswer" | "long" | "essay" | "openended" => Some(QuestionKind::LongAnswer),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answer to a true/false question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TruthValue {
    True,
    False,
}

impl TruthValue {
    /// Canonical capitalized form, as it appears in the option list.
    pub const fn as_str(self) -> &'static str {
        match self {
            TruthValue::True => "True",
            TruthValue::False => "False",
        }
    }

    /// Case-insensitive parse of "true" / "false".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Some(TruthValue::True)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Some(TruthValue::False)
        } else {
            None
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The correct answer of a multiple-choice question.
///
/// `Aligned` means the raw answer was matched against the extracted options
/// (a bare letter resolved to that option's text, or a textual answer equal
/// to one of the options). `Placeholder` means alignment failed and the text
/// is a best-effort value the caller should not treat as authoritative.
///
/// Serializes as the bare answer text; the placeholder flag is recomputed
/// from the option list whenever the record is re-extracted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Aligned(String),
    Placeholder(String),
}

impl Answer {
    /// The answer text, always present regardless of alignment status.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Answer::Aligned(s) | Answer::Placeholder(s) => s,
        }
    }

    /// True if alignment against the option list failed.
    #[inline]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Answer::Placeholder(_))
    }
}

/// Variant payload of a [`Question`].
///
/// A closed sum: every consumption site matches exhaustively, so adding a
/// kind is a compile-visible change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionForm {
    /// Lettered options; `options` holds exactly the options found (2–8,
    /// never empty strings, gaps dropped rather than null-padded).
    MultipleChoice {
        options: Vec<String>,
        correct_answer: Answer,
    },
    /// Logical options are always `["True", "False"]`; see
    /// [`Question::options`].
    TrueFalse { correct_answer: TruthValue },
    FillBlank { correct_answer: String },
    ShortAnswer { correct_answer: String },
    /// No correct answer; `Question::explanation` carries the grading
    /// guidance instead.
    LongAnswer,
}

impl QuestionForm {
    /// The kind tag for this variant.
    pub const fn kind(&self) -> QuestionKind {
        match self {
            QuestionForm::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionForm::TrueFalse { .. } => QuestionKind::TrueFalse,
            QuestionForm::FillBlank { .. } => QuestionKind::FillBlank,
            QuestionForm::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            QuestionForm::LongAnswer => QuestionKind::LongAnswer,
        }
    }
}

/// One extracted question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position, unique and densely increasing within one quiz.
    pub id: u32,
    /// Question prompt, never empty.
    pub text: String,
    /// Never empty; defaults to a placeholder when extraction found none.
    /// For long-answer questions this holds the grading guidance.
    pub explanation: String,
    #[serde(flatten)]
    pub form: QuestionForm,
}

impl Question {
    /// The semantic kind of this question.
    #[inline]
    pub const fn kind(&self) -> QuestionKind {
        self.form.kind()
    }

    /// The option list as the caller should render it.
    ///
    /// True/false questions report the fixed `["True", "False"]` pair;
    /// kinds without options report an empty list.
    pub fn options(&self) -> Vec<&str> {
        match &self.form {
            QuestionForm::MultipleChoice { options, .. } => {
                options.iter().map(String::as_str).collect()
            }
            QuestionForm::TrueFalse { .. } => vec!["True", "False"],
            _ => Vec::new(),
        }
    }

    /// The correct answer text, if the kind has one.
    pub fn correct_answer(&self) -> Option<&str> {
        match &self.form {
            QuestionForm::MultipleChoice { correct_answer, .. } => Some(correct_answer.text()),
            QuestionForm::TrueFalse { correct_answer } => Some(correct_answer.as_str()),
            QuestionForm::FillBlank { correct_answer }
            | QuestionForm::ShortAnswer { correct_answer } => Some(correct_answer),
            QuestionForm::LongAnswer => None,
        }
    }
}

/// A fully-normalized quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    /// Dominant kind across `questions`; ties resolve to the kind that
    /// appears earliest.
    pub question_type: QuestionKind,
    /// Always at least one question.
    pub questions: Vec<Question>,
}

/// Rubric-weighted grading of a single submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Awarded score per criterion, clamped into `[0, weight]`.
    pub criterion_scores: BTreeMap<String, f64>,
    /// Feedback text per criterion, never empty.
    pub criterion_feedback: BTreeMap<String, String>,
    pub overall_feedback: String,
    /// Clamped so `total_score <= max_score` always holds.
    pub total_score: f64,
    pub max_score: f64,
}

/// Per-criterion essay evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionEvaluation {
    pub name: String,
    /// Percentage scale, clamped into `[0, 100]`.
    pub score: f64,
    pub feedback: String,
}

/// A structured essay evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayEvaluation {
    pub criteria: Vec<CriterionEvaluation>,
    pub overall_feedback: String,
    /// Non-empty after normalization.
    pub strengths: Vec<String>,
    /// Non-empty after normalization.
    pub areas_for_improvement: Vec<String>,
    /// Clamped into `[0, rubric max]`.
    pub suggested_points: f64,
}

/// Personalized feedback on a student's work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Never empty; falls back to the whole raw text, then to a placeholder.
    pub summary: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A named, weighted grading criterion supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    pub max_points: f64,
}

impl RubricCriterion {
    /// Creates a new criterion.
    pub fn new(name: impl Into<String>, max_points: f64) -> Self {
        Self {
            name: name.into(),
            max_points,
        }
    }
}

/// The caller-supplied rubric used to key and clamp grading output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub criteria: Vec<RubricCriterion>,
}

impl Rubric {
    /// Creates a rubric from a list of criteria.
    pub fn new(criteria: Vec<RubricCriterion>) -> Self {
        Self { criteria }
    }

    /// Sum of criterion weights. Zero for an empty rubric; the normalizer
    /// substitutes its default bound in that case.
    pub fn max_score(&self) -> f64 {
        self.criteria.iter().map(|c| c.max_points).sum()
    }

    /// True if the rubric carries no criteria.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Kind-dispatched extraction result, returned by [`crate::extract`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Quiz(Quiz),
    Feedback(Feedback),
    GradingResult(GradingResult),
    EssayEvaluation(EssayEvaluation),
}

impl Content {
    /// The content kind of this record.
    pub const fn kind(&self) -> ContentKind {
        match self {
            Content::Quiz(_) => ContentKind::Quiz,
            Content::Feedback(_) => ContentKind::Feedback,
            Content::GradingResult(_) => ContentKind::GradingResult,
            Content::EssayEvaluation(_) => ContentKind::EssayEvaluation,
        }
    }
}
