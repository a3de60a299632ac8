//! Tier 1: strict decoding of the whole payload as one document.
//!
//! The wire shapes are deliberately lenient about *field spelling* (alias
//! tolerance for camelCase and snake_case, scalars accepted as strings or
//! numbers) but strict about *syntax*: any decode error, and any payload
//! that decodes into the wrong top-level shape for the requested kind,
//! falls through to the next tier.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::draft::{DraftEvaluation, DraftOptions, DraftQuestion, QuizMeta};
use crate::error::{TierError, TierResult};
use crate::model::QuestionKind;

/// A strictly-decoded quiz, reduced to drafts for the shared assembly path.
#[derive(Debug)]
pub(crate) struct DecodedQuiz {
    pub meta: QuizMeta,
    pub drafts: Vec<(DraftQuestion, Option<QuestionKind>)>,
}

/// Fast check that the payload could plausibly be a document.
#[inline]
pub(crate) fn looks_like_document(s: &str) -> bool {
    matches!(s.chars().next(), Some('{') | Some('['))
}

static NUMBER_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("invalid number pattern"));

/// Coerces a scalar JSON value to display text.
///
/// Numbers are stringified (a model asked for options often emits `[3, 4]`
/// instead of `["3", "4"]`), booleans become the canonical True/False pair,
/// and empty or non-scalar values are rejected.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

/// Coerces a scalar JSON value to a number, accepting `"8"`, `"85%"`, and
/// `"8/10"` string spellings (the fraction keeps its numerator).
pub(crate) fn scalar_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            if let Ok(v) = trimmed.parse::<f64>() {
                return Some(v);
            }
            NUMBER_IN_TEXT
                .find(trimmed)
                .and_then(|m| m.as_str().parse().ok())
        }
        _ => None,
    }
}

// ---------------------------------------------------------------- quiz ----

#[derive(Debug, Default, Deserialize)]
struct QuizDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default, alias = "questionType")]
    question_type: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct QuestionDoc {
    #[serde(default, alias = "question", alias = "prompt")]
    text: Option<Value>,
    #[serde(default)]
    options: Vec<Value>,
    #[serde(default, alias = "correctAnswer", alias = "answer")]
    correct_answer: Option<Value>,
    #[serde(default)]
    explanation: Option<Value>,
    #[serde(default, alias = "type", alias = "questionType", alias = "question_type")]
    kind: Option<String>,
}

impl QuestionDoc {
    fn into_draft(self) -> (DraftQuestion, Option<QuestionKind>) {
        let declared = self.kind.as_deref().and_then(QuestionKind::from_declared);
        let options: Vec<String> = self.options.iter().filter_map(scalar_text).collect();

        let draft = DraftQuestion {
            text: self
                .text
                .as_ref()
                .and_then(scalar_text)
                .unwrap_or_default(),
            options: DraftOptions::Ordered(options),
            answer: self.correct_answer.as_ref().and_then(scalar_text),
            explanation: self.explanation.as_ref().and_then(scalar_text),
        };

        (draft, declared)
    }
}

/// The quiz payload is usually an object, but models sometimes emit the
/// question array bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuizPayload {
    Document(QuizDoc),
    BareQuestions(Vec<QuestionDoc>),
}

/// Strictly decodes the whole payload as a quiz document.
pub(crate) fn quiz_document(input: &str) -> TierResult<DecodedQuiz> {
    let trimmed = input.trim();
    if !looks_like_document(trimmed) {
        return Err(TierError::WrongShape("quiz"));
    }

    let payload: QuizPayload = serde_json::from_str(trimmed)?;
    let doc = match payload {
        QuizPayload::Document(doc) => doc,
        QuizPayload::BareQuestions(questions) => QuizDoc {
            questions,
            ..Default::default()
        },
    };

    // An arbitrary object decodes into an all-default QuizDoc; a quiz
    // without questions is not a quiz.
    if doc.questions.is_empty() {
        return Err(TierError::WrongShape("quiz"));
    }

    let meta = QuizMeta {
        title: clean_meta(doc.title),
        subject: clean_meta(doc.subject),
        topic: clean_meta(doc.topic),
        difficulty: clean_meta(doc.difficulty),
        declared_kind: doc
            .question_type
            .as_deref()
            .and_then(QuestionKind::from_declared),
    };

    let drafts = doc
        .questions
        .into_iter()
        .map(QuestionDoc::into_draft)
        .collect();

    Ok(DecodedQuiz { meta, drafts })
}

fn clean_meta(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ------------------------------------------------------------- grading ----

#[derive(Debug, Deserialize)]
struct GradingDoc {
    #[serde(default, alias = "criteriaScores", alias = "criterionScores", alias = "scores")]
    criteria_scores: BTreeMap<String, Value>,
    #[serde(default, alias = "criteriaFeedback", alias = "criterionFeedback")]
    criteria_feedback: BTreeMap<String, Value>,
    #[serde(default, alias = "overallFeedback", alias = "feedback")]
    overall_feedback: Option<Value>,
    #[serde(default, alias = "totalScore", alias = "score")]
    total_score: Option<Value>,
    #[serde(default, alias = "maxScore")]
    max_score: Option<Value>,
}

/// Strictly decodes the whole payload as a grading-result document.
pub(crate) fn grading_document(input: &str) -> TierResult<DraftEvaluation> {
    let trimmed = input.trim();
    if !looks_like_document(trimmed) {
        return Err(TierError::WrongShape("grading"));
    }

    let doc: GradingDoc = serde_json::from_str(trimmed)?;
    if doc.criteria_scores.is_empty() && doc.total_score.is_none() && doc.overall_feedback.is_none()
    {
        return Err(TierError::WrongShape("grading"));
    }

    let mut draft = DraftEvaluation::default();
    for (name, value) in &doc.criteria_scores {
        if let Some(score) = scalar_number(value) {
            draft.scores.push((name.clone(), score));
        }
    }
    for (name, value) in &doc.criteria_feedback {
        if let Some(text) = scalar_text(value) {
            draft.criterion_feedback.push((name.clone(), text));
        }
    }
    draft.overall_feedback = doc.overall_feedback.as_ref().and_then(scalar_text);
    draft.total_score = doc.total_score.as_ref().and_then(scalar_number);
    draft.max_score = doc.max_score.as_ref().and_then(scalar_number);

    Ok(draft)
}

// --------------------------------------------------------------- essay ----

#[derive(Debug, Deserialize)]
struct EssayDoc {
    #[serde(default)]
    criteria: Vec<CriterionDoc>,
    #[serde(default, alias = "overallFeedback", alias = "feedback")]
    overall_feedback: Option<Value>,
    #[serde(default)]
    strengths: Vec<Value>,
    #[serde(
        default,
        alias = "areasForImprovement",
        alias = "improvements",
        alias = "weaknesses"
    )]
    areas_for_improvement: Vec<Value>,
    #[serde(default, alias = "suggestedPoints", alias = "suggestedScore")]
    suggested_points: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CriterionDoc {
    #[serde(default, alias = "criterion")]
    name: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default, alias = "comment", alias = "comments")]
    feedback: Option<Value>,
}

/// Strictly decodes the whole payload as an essay-evaluation document.
pub(crate) fn essay_document(input: &str) -> TierResult<DraftEvaluation> {
    let trimmed = input.trim();
    if !looks_like_document(trimmed) {
        return Err(TierError::WrongShape("essay evaluation"));
    }

    let doc: EssayDoc = serde_json::from_str(trimmed)?;
    if doc.criteria.is_empty()
        && doc.overall_feedback.is_none()
        && doc.suggested_points.is_none()
        && doc.strengths.is_empty()
    {
        return Err(TierError::WrongShape("essay evaluation"));
    }

    let mut draft = DraftEvaluation::default();
    for criterion in &doc.criteria {
        let Some(name) = criterion.name.as_ref().and_then(scalar_text) else {
            continue;
        };
        if let Some(score) = criterion.score.as_ref().and_then(scalar_number) {
            draft.scores.push((name.clone(), score));
        }
        if let Some(feedback) = criterion.feedback.as_ref().and_then(scalar_text) {
            draft.criterion_feedback.push((name, feedback));
        }
    }
    draft.overall_feedback = doc.overall_feedback.as_ref().and_then(scalar_text);
    draft.strengths = doc.strengths.iter().filter_map(scalar_text).collect();
    draft.areas_for_improvement = doc
        .areas_for_improvement
        .iter()
        .filter_map(scalar_text)
        .collect();
    draft.suggested_points = doc.suggested_points.as_ref().and_then(scalar_number);

    Ok(draft)
}

// ------------------------------------------------------------ feedback ----

#[derive(Debug, Deserialize)]
struct FeedbackDoc {
    #[serde(default, alias = "overall", alias = "overallFeedback", alias = "message")]
    summary: Option<Value>,
    #[serde(default)]
    strengths: Vec<Value>,
    #[serde(
        default,
        alias = "areasForImprovement",
        alias = "improvements",
        alias = "weaknesses"
    )]
    areas_for_improvement: Vec<Value>,
    #[serde(default, alias = "nextSteps", alias = "recommendations")]
    suggestions: Vec<Value>,
}

/// Strictly decodes the whole payload as a feedback document.
pub(crate) fn feedback_document(input: &str) -> TierResult<DraftEvaluation> {
    let trimmed = input.trim();
    if !looks_like_document(trimmed) {
        return Err(TierError::WrongShape("feedback"));
    }

    let doc: FeedbackDoc = serde_json::from_str(trimmed)?;
    if doc.summary.is_none()
        && doc.strengths.is_empty()
        && doc.areas_for_improvement.is_empty()
        && doc.suggestions.is_empty()
    {
        return Err(TierError::WrongShape("feedback"));
    }

    let mut draft = DraftEvaluation::default();
    draft.overall_feedback = doc.summary.as_ref().and_then(scalar_text);
    draft.strengths = doc.strengths.iter().filter_map(scalar_text).collect();
    draft.areas_for_improvement = doc
        .areas_for_improvement
        .iter()
        .filter_map(scalar_text)
        .collect();
    draft.suggestions = doc.suggestions.iter().filter_map(scalar_text).collect();

    Ok(draft)
}
