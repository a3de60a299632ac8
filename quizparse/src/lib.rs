//! # quizparse
//!
//! A forgiving extractor that converts messy generative-model output into
//! strictly-typed educational content: quizzes, grading results,
//! personalized feedback, and essay evaluations.
//!
//! Model output is rarely the clean document you asked for. This library
//! handles the usual failure modes:
//! - JSON wrapped in prose commentary or markdown code fences
//! - camelCase/snake_case field drift and stringified numbers
//! - responses that are not JSON at all, just numbered questions in text
//! - truncated or half-structured output
//!
//! ## Quick Start
//!
//! ```rust
//! use quizparse::extract_quiz;
//!
//! // A document buried in commentary still extracts cleanly.
//! let messy = r#"Sure! Here's your quiz:
//! {"questions": [{"question": "What is 2+2?", "options": [3, 4, 5], "correctAnswer": "B"}]}
//! Hope this helps!"#;
//!
//! let quiz = extract_quiz(messy).value;
//! assert_eq!(quiz.questions[0].options(), vec!["3", "4", "5"]);
//! assert_eq!(quiz.questions[0].correct_answer(), Some("4"));
//! ```
//!
//! ## How it works
//!
//! Four tiers are tried in order: strict decode of the whole payload, strict
//! decode of an embedded `{...}` span, pattern-rule segmentation, and a
//! line-oriented state machine. Whatever survives is normalized (placeholder
//! defaults, numeric clamping) and validated (at least one question, dense
//! ids). The entry points below never fail and never panic — the worst
//! possible input yields a synthesized placeholder record flagged with low
//! confidence:
//!
//! ```rust
//! use quizparse::extract_quiz;
//!
//! let extraction = extract_quiz("complete garbage, no structure at all");
//! assert!(extraction.is_low_confidence());
//! assert!(!extraction.value.questions.is_empty());
//! ```

mod clean;
mod error;
mod validate;

pub mod align;
pub mod classify;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use model::{
    Answer, Content, ContentKind, CriterionEvaluation, EssayEvaluation, Feedback, GradingResult,
    Question, QuestionForm, QuestionKind, Quiz, RawResponse, Rubric, RubricCriterion, TruthValue,
};
pub use normalize::{DEFAULT_ANSWER, DEFAULT_EXPLANATION};
pub use pipeline::{Extraction, Tier, LOW_CONFIDENCE_THRESHOLD};

/// Extracts a quiz from raw model output.
///
/// # Examples
///
/// ```
/// use quizparse::{extract_quiz, QuestionKind};
///
/// let response = "1. What is 2+2? A) 3 B) 4 C) 5 Answer: B Explanation: Basic arithmetic";
/// let quiz = extract_quiz(response).value;
///
/// assert_eq!(quiz.questions.len(), 1);
/// assert_eq!(quiz.questions[0].kind(), QuestionKind::MultipleChoice);
/// assert_eq!(quiz.questions[0].explanation, "Basic arithmetic");
/// ```
pub fn extract_quiz(input: &str) -> Extraction<Quiz> {
    pipeline::run_quiz(input)
}

/// Extracts personalized feedback from raw model output.
///
/// # Examples
///
/// ```
/// use quizparse::extract_feedback;
///
/// let response = r#"{"overall": "Strong effort", "strengths": ["Clear writing"]}"#;
/// let feedback = extract_feedback(response).value;
///
/// assert_eq!(feedback.summary, "Strong effort");
/// assert!(!feedback.areas_for_improvement.is_empty()); // defaulted, never empty
/// ```
pub fn extract_feedback(input: &str) -> Extraction<Feedback> {
    pipeline::run_feedback(input)
}

/// Extracts a grading result from raw model output.
///
/// The rubric keys the criterion maps and bounds every numeric field:
/// per-criterion scores clamp to their weights and the total clamps to the
/// rubric maximum.
///
/// # Examples
///
/// ```
/// use quizparse::{extract_grading, Rubric, RubricCriterion};
///
/// let rubric = Rubric::new(vec![
///     RubricCriterion::new("Clarity", 10.0),
///     RubricCriterion::new("Evidence", 10.0),
/// ]);
/// let response = "Clarity: 8/10 — crisp prose\nEvidence: 6/10\nTotal: 14/20";
///
/// let result = extract_grading(response, &rubric).value;
/// assert_eq!(result.criterion_scores["Clarity"], 8.0);
/// assert_eq!(result.total_score, 14.0);
/// assert!(result.total_score <= result.max_score);
/// ```
pub fn extract_grading(input: &str, rubric: &Rubric) -> Extraction<GradingResult> {
    pipeline::run_grading(input, rubric)
}

/// Extracts an essay evaluation from raw model output.
///
/// Criterion scores are treated as percentages and clamped into `[0, 100]`;
/// suggested points clamp to the rubric maximum.
pub fn extract_essay_evaluation(input: &str, rubric: &Rubric) -> Extraction<EssayEvaluation> {
    pipeline::run_essay(input, rubric)
}

/// Kind-dispatched extraction for callers that carry a [`RawResponse`].
///
/// Grading and essay kinds use the rubric when one is supplied; without one
/// an empty rubric is assumed and numeric bounds fall back to their
/// defaults.
///
/// # Examples
///
/// ```
/// use quizparse::{extract, Content, ContentKind, RawResponse};
///
/// let response = RawResponse::new("1. Name a prime number. Answer: 7", ContentKind::Quiz);
/// let extraction = extract(&response, None);
///
/// match extraction.value {
///     Content::Quiz(quiz) => assert_eq!(quiz.questions.len(), 1),
///     other => panic!("expected a quiz, got {other:?}"),
/// }
/// ```
pub fn extract(response: &RawResponse, rubric: Option<&Rubric>) -> Extraction<Content> {
    let default_rubric = Rubric::default();
    let rubric = rubric.unwrap_or(&default_rubric);

    match response.kind {
        ContentKind::Quiz => pipeline::run_quiz(&response.text).map(Content::Quiz),
        ContentKind::Feedback => pipeline::run_feedback(&response.text).map(Content::Feedback),
        ContentKind::GradingResult => {
            pipeline::run_grading(&response.text, rubric).map(Content::GradingResult)
        }
        ContentKind::EssayEvaluation => {
            pipeline::run_essay(&response.text, rubric).map(Content::EssayEvaluation)
        }
    }
}
