//! Cascade coordinator: four decoding tiers, then normalization and
//! validation.
//!
//! Tiers are tried in a fixed order — strict decode, embedded-document
//! recovery, pattern segmentation, line heuristics — and the first success
//! wins. A tier failure is never an error for the caller; when everything
//! fails, the validator synthesizes a placeholder record, so every cascade
//! returns a usable value for every input.

pub(crate) mod decode;
pub(crate) mod draft;
pub(crate) mod embedded;
pub(crate) mod lines;
pub(crate) mod prose;
pub(crate) mod segment;

use tracing::debug;

use crate::error::TierResult;
use crate::model::{EssayEvaluation, Feedback, GradingResult, Quiz, Rubric};
use crate::{clean, normalize, validate};
use draft::{DraftEvaluation, QuizMeta};

/// Threshold under which [`Extraction::is_low_confidence`] reports true.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Which tier of the cascade produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// The whole payload decoded strictly.
    StrictDecode,
    /// A brace-delimited span inside the payload decoded strictly.
    EmbeddedDocument,
    /// Pattern-rule segmentation recovered the structure.
    Segmentation,
    /// The line-oriented state machine recovered the structure.
    LineHeuristic,
    /// Every tier failed; the result is a synthesized placeholder.
    Synthesized,
}

impl Tier {
    /// Fixed confidence for values produced by this tier.
    pub const fn confidence(self) -> f32 {
        match self {
            Tier::StrictDecode => 1.0,
            Tier::EmbeddedDocument => 0.9,
            Tier::Segmentation => 0.6,
            Tier::LineHeuristic => 0.4,
            Tier::Synthesized => 0.1,
        }
    }

    /// Short name for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Tier::StrictDecode => "strict_decode",
            Tier::EmbeddedDocument => "embedded_document",
            Tier::Segmentation => "segmentation",
            Tier::LineHeuristic => "line_heuristic",
            Tier::Synthesized => "synthesized",
        }
    }
}

/// A normalized record plus metadata about how it was recovered.
///
/// The confidence score is fixed per tier; callers that receive a
/// low-confidence extraction may want to retry the upstream generative
/// call rather than surface the placeholder-heavy result.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub value: T,
    pub tier: Tier,
    confidence: f32,
}

impl<T> Extraction<T> {
    pub(crate) fn new(value: T, tier: Tier) -> Self {
        Self {
            value,
            tier,
            confidence: tier.confidence(),
        }
    }

    /// Confidence in `[0.0, 1.0]`, higher is better.
    #[inline]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// True when the caller should consider retrying the upstream call.
    #[inline]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }

    /// Maps the value, keeping tier and confidence.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        Extraction {
            value: f(self.value),
            tier: self.tier,
            confidence: self.confidence,
        }
    }
}

/// Runs the quiz cascade over raw model output.
pub(crate) fn run_quiz(input: &str) -> Extraction<Quiz> {
    let text = clean::preprocess(input);

    match decode::quiz_document(&text) {
        Ok(decoded) => return Extraction::new(assemble_quiz(decoded, input), Tier::StrictDecode),
        Err(error) => debug!(tier = Tier::StrictDecode.name(), %error, "tier failed"),
    }

    match embedded::document_span(&text).and_then(decode::quiz_document) {
        Ok(decoded) => {
            return Extraction::new(assemble_quiz(decoded, input), Tier::EmbeddedDocument)
        }
        Err(error) => debug!(tier = Tier::EmbeddedDocument.name(), %error, "tier failed"),
    }

    match segment::segment(&text) {
        Ok(drafts) => {
            let questions = drafts
                .into_iter()
                .map(|draft| normalize::question_from_draft(draft, None))
                .collect();
            return Extraction::new(
                validate::finalize_quiz(QuizMeta::default(), questions, input),
                Tier::Segmentation,
            );
        }
        Err(error) => debug!(tier = Tier::Segmentation.name(), %error, "tier failed"),
    }

    match lines::LineParser::new().parse(&text) {
        Ok(parsed) => {
            let meta = QuizMeta {
                title: parsed.title,
                ..Default::default()
            };
            let questions = parsed
                .drafts
                .into_iter()
                .map(|draft| normalize::question_from_draft(draft, None))
                .collect();
            return Extraction::new(
                validate::finalize_quiz(meta, questions, input),
                Tier::LineHeuristic,
            );
        }
        Err(error) => debug!(tier = Tier::LineHeuristic.name(), %error, "tier failed"),
    }

    debug!(tier = Tier::Synthesized.name(), "all tiers failed, synthesizing");
    Extraction::new(
        validate::finalize_quiz(QuizMeta::default(), Vec::new(), input),
        Tier::Synthesized,
    )
}

/// Runs the grading cascade. The rubric keys the output maps and bounds
/// every numeric field.
pub(crate) fn run_grading(input: &str, rubric: &Rubric) -> Extraction<GradingResult> {
    let (draft, tier) = run_rubric_cascade(input, rubric, decode::grading_document);
    Extraction::new(normalize::grading(draft, rubric, input), tier)
}

/// Runs the essay-evaluation cascade.
pub(crate) fn run_essay(input: &str, rubric: &Rubric) -> Extraction<EssayEvaluation> {
    let (draft, tier) = run_rubric_cascade(input, rubric, decode::essay_document);
    Extraction::new(normalize::essay(draft, rubric, input), tier)
}

/// Runs the feedback cascade. Feedback has no rubric; the prose tiers run
/// with an empty one.
pub(crate) fn run_feedback(input: &str) -> Extraction<Feedback> {
    let rubric = Rubric::default();
    let (draft, tier) = run_rubric_cascade(input, &rubric, decode::feedback_document);
    Extraction::new(normalize::feedback(draft, input), tier)
}

/// The shared cascade for rubric-shaped kinds; only the strict-decode wire
/// shape differs per kind.
fn run_rubric_cascade(
    input: &str,
    rubric: &Rubric,
    decode_document: fn(&str) -> TierResult<DraftEvaluation>,
) -> (DraftEvaluation, Tier) {
    let text = clean::preprocess(input);

    match decode_document(&text) {
        Ok(draft) => return (draft, Tier::StrictDecode),
        Err(error) => debug!(tier = Tier::StrictDecode.name(), %error, "tier failed"),
    }

    match embedded::document_span(&text).and_then(decode_document) {
        Ok(draft) => return (draft, Tier::EmbeddedDocument),
        Err(error) => debug!(tier = Tier::EmbeddedDocument.name(), %error, "tier failed"),
    }

    match prose::segment_sections(&text, rubric) {
        Ok(draft) => return (draft, Tier::Segmentation),
        Err(error) => debug!(tier = Tier::Segmentation.name(), %error, "tier failed"),
    }

    match prose::line_scan(&text, rubric) {
        Ok(draft) => return (draft, Tier::LineHeuristic),
        Err(error) => debug!(tier = Tier::LineHeuristic.name(), %error, "tier failed"),
    }

    debug!(tier = Tier::Synthesized.name(), "all tiers failed, synthesizing");
    (DraftEvaluation::default(), Tier::Synthesized)
}

/// Shared assembly for strictly-decoded quizzes: per-question declared
/// kinds win, then the quiz-level declared kind, then classification.
fn assemble_quiz(decoded: decode::DecodedQuiz, raw: &str) -> Quiz {
    let decode::DecodedQuiz { meta, drafts } = decoded;
    let quiz_kind = meta.declared_kind;

    let questions = drafts
        .into_iter()
        .filter(|(draft, _)| !draft.is_empty())
        .map(|(draft, declared)| normalize::question_from_draft(draft, declared.or(quiz_kind)))
        .collect();

    validate::finalize_quiz(meta, questions, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, RubricCriterion};

    #[test]
    fn test_well_formed_document_short_circuits() {
        let input = r#"{"title": "T", "questions": [{"question": "Q?", "answer": "A"}]}"#;
        let extraction = run_quiz(input);

        assert_eq!(extraction.tier, Tier::StrictDecode);
        assert_eq!(extraction.confidence(), 1.0);
        assert!(!extraction.is_low_confidence());
    }

    #[test]
    fn test_prose_wrapped_document_uses_embedded_tier() {
        let input = r#"Here is your quiz! {"questions": [{"question": "Q?", "answer": "A"}]} Enjoy."#;
        let extraction = run_quiz(input);

        assert_eq!(extraction.tier, Tier::EmbeddedDocument);
        assert_eq!(extraction.value.questions.len(), 1);
    }

    #[test]
    fn test_single_line_segment_cascade() {
        let input = "1. What is 2+2? A) 3 B) 4 C) 5 Answer: B Explanation: Basic arithmetic";
        let extraction = run_quiz(input);

        assert_eq!(extraction.tier, Tier::Segmentation);
        let quiz = &extraction.value;
        assert_eq!(quiz.questions.len(), 1);

        let question = &quiz.questions[0];
        assert_eq!(question.kind(), QuestionKind::MultipleChoice);
        assert_eq!(question.options(), vec!["3", "4", "5"]);
        assert_eq!(question.correct_answer(), Some("4"));
        assert_eq!(question.explanation, "Basic arithmetic");
    }

    #[test]
    fn test_line_heuristic_tier() {
        // No "Question N" or "N." labels, so segmentation fails and the
        // line machine takes over.
        let input = "Geography check\nAnswer: True\nExplanation: Correct as stated.";
        let extraction = run_quiz(input);

        assert_eq!(extraction.tier, Tier::LineHeuristic);
        assert!(extraction.is_low_confidence());
        assert_eq!(extraction.value.questions.len(), 1);
    }

    #[test]
    fn test_empty_input_synthesizes() {
        let extraction = run_quiz("");

        assert_eq!(extraction.tier, Tier::Synthesized);
        assert!(extraction.is_low_confidence());
        assert_eq!(extraction.value.questions.len(), 1);
        assert_eq!(extraction.value.questions[0].id, 1);
    }

    #[test]
    fn test_grading_cascade_prose_tier() {
        let rubric = Rubric::new(vec![RubricCriterion::new("Clarity", 10.0)]);
        let input = "Clarity: 8/10 — well organized\nTotal: 8/10";
        let extraction = run_grading(input, &rubric);

        assert_eq!(extraction.tier, Tier::Segmentation);
        assert_eq!(extraction.value.criterion_scores["Clarity"], 8.0);
        assert_eq!(extraction.value.total_score, 8.0);
    }

    #[test]
    fn test_feedback_cascade_strict_tier() {
        let input = r#"{"overall": "Nice work", "strengths": ["Clear"]}"#;
        let extraction = run_feedback(input);

        assert_eq!(extraction.tier, Tier::StrictDecode);
        assert_eq!(extraction.value.summary, "Nice work");
    }

    #[test]
    fn test_extraction_map_preserves_metadata() {
        let extraction = run_quiz("").map(|quiz| quiz.questions.len());
        assert_eq!(extraction.value, 1);
        assert_eq!(extraction.tier, Tier::Synthesized);
        assert_eq!(extraction.confidence(), Tier::Synthesized.confidence());
    }

    #[test]
    fn test_tier_confidence_ordering() {
        assert!(Tier::StrictDecode.confidence() > Tier::EmbeddedDocument.confidence());
        assert!(Tier::EmbeddedDocument.confidence() > Tier::Segmentation.confidence());
        assert!(Tier::Segmentation.confidence() > Tier::LineHeuristic.confidence());
        assert!(Tier::LineHeuristic.confidence() > Tier::Synthesized.confidence());
    }
}
