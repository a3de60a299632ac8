//! Defaulting and clamping applied to every record the pipeline emits.
//!
//! Whichever tier produced the raw material, assembly runs through here, so
//! the output contract (no absent fields, bounded numbers, non-empty
//! required lists) holds on a single code path.

use std::collections::BTreeMap;

use crate::align::{align_options, resolve_answer};
use crate::classify::classify;
use crate::model::{
    Answer, CriterionEvaluation, EssayEvaluation, Feedback, GradingResult, Question, QuestionForm,
    QuestionKind, Quiz, Rubric, TruthValue,
};
use crate::pipeline::draft::{DraftEvaluation, DraftOptions, DraftQuestion, QuizMeta};

/// Placeholder when extraction recovered no explanation.
pub const DEFAULT_EXPLANATION: &str = "No explanation provided";

/// Placeholder when extraction recovered no answer.
pub const DEFAULT_ANSWER: &str = "See explanation";

pub(crate) const DEFAULT_FEEDBACK: &str = "No feedback provided";
pub(crate) const DEFAULT_TITLE: &str = "Untitled Quiz";
pub(crate) const DEFAULT_SUBJECT: &str = "General";
pub(crate) const DEFAULT_TOPIC: &str = "General";
pub(crate) const DEFAULT_DIFFICULTY: &str = "Medium";

/// Clamping bound when no rubric supplies one.
pub(crate) const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Per-criterion essay scores are treated as percentages.
const CRITERION_SCALE: f64 = 100.0;

/// Most options a multiple-choice question may carry.
pub(crate) const MAX_OPTIONS: usize = 8;

const DEFAULT_STRENGTHS: [&str; 2] = [
    "The response addresses the prompt",
    "The main ideas are identifiable",
];
const DEFAULT_AREAS: [&str; 2] = [
    "Add more supporting detail",
    "Improve structure and clarity",
];
const DEFAULT_SUGGESTIONS: [&str; 2] = [
    "Review the source material",
    "Revise and resubmit for fresh feedback",
];

/// Clamps a raw score into `[0, max]`. Absent and non-finite values become 0.
pub(crate) fn clamp_score(value: Option<f64>, max: f64) -> f64 {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// Assembles one question from a draft: alignment, classification, and
/// field defaulting. The id is assigned later, once the whole sequence is
/// known.
pub(crate) fn question_from_draft(
    draft: DraftQuestion,
    declared: Option<QuestionKind>,
) -> Question {
    let DraftQuestion {
        text,
        options,
        answer,
        explanation,
    } = draft;
    let text = text.trim().to_string();

    let (mut option_list, mut pairs) = match options {
        DraftOptions::Lettered(pairs) => (align_options(&pairs), pairs),
        DraftOptions::Ordered(list) => {
            let cleaned: Vec<String> = list
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .take(MAX_OPTIONS)
                .collect();
            // Letter the head of the list so bare-letter answers resolve.
            let pairs = cleaned
                .iter()
                .take(4)
                .enumerate()
                .map(|(i, text)| ((b'A' + i as u8) as char, text.clone()))
                .collect();
            (cleaned, pairs)
        }
    };

    let mut answer = answer
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    // A lone option cannot form a choice set; salvage its text as the
    // answer when none was extracted.
    if option_list.len() == 1 {
        let lone = option_list.remove(0);
        pairs.clear();
        if answer.is_none() {
            answer = Some(lone);
        }
    }

    let kind = declared
        .filter(|kind| kind_fits(*kind, &option_list))
        .unwrap_or_else(|| classify(&text, &option_list, answer.as_deref()));

    let explanation = explanation
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let (form, explanation) = match kind {
        QuestionKind::MultipleChoice => {
            let correct_answer = match &answer {
                Some(raw) => resolve_answer(raw, &pairs, &option_list),
                None => Answer::Placeholder(DEFAULT_ANSWER.to_string()),
            };
            (
                QuestionForm::MultipleChoice {
                    options: option_list,
                    correct_answer,
                },
                explanation,
            )
        }
        QuestionKind::TrueFalse => {
            let correct_answer = answer
                .as_deref()
                .map(|raw| match resolve_answer(raw, &pairs, &option_list) {
                    Answer::Aligned(text) | Answer::Placeholder(text) => text,
                })
                .and_then(|text| TruthValue::parse(&text))
                .unwrap_or(TruthValue::True);
            (QuestionForm::TrueFalse { correct_answer }, explanation)
        }
        QuestionKind::FillBlank => (
            QuestionForm::FillBlank {
                correct_answer: answer.unwrap_or_else(|| DEFAULT_ANSWER.to_string()),
            },
            explanation,
        ),
        QuestionKind::ShortAnswer => (
            QuestionForm::ShortAnswer {
                correct_answer: answer.unwrap_or_else(|| DEFAULT_ANSWER.to_string()),
            },
            explanation,
        ),
        QuestionKind::LongAnswer => {
            // Any extracted answer is really grading guidance here.
            (QuestionForm::LongAnswer, explanation.or(answer))
        }
    };

    Question {
        id: 0,
        text,
        explanation: explanation.unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        form,
    }
}

/// A declared kind is honored only when the extracted fields can support it.
fn kind_fits(kind: QuestionKind, options: &[String]) -> bool {
    match kind {
        QuestionKind::MultipleChoice => options.len() >= 2,
        _ => true,
    }
}

/// Fills quiz metadata defaults and computes the dominant question type.
pub(crate) fn quiz(meta: QuizMeta, questions: Vec<Question>) -> Quiz {
    Quiz {
        title: meta.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        subject: meta.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        topic: meta.topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
        difficulty: meta
            .difficulty
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        question_type: dominant_kind(&questions),
        questions,
    }
}

/// Most frequent kind; ties resolve to the kind appearing earliest.
fn dominant_kind(questions: &[Question]) -> QuestionKind {
    let mut counts: Vec<(QuestionKind, usize)> = Vec::new();
    for question in questions {
        match counts.iter_mut().find(|(kind, _)| *kind == question.kind()) {
            Some((_, count)) => *count += 1,
            None => counts.push((question.kind(), 1)),
        }
    }

    let mut best = (QuestionKind::ShortAnswer, 0);
    for (kind, count) in counts {
        if count > best.1 {
            best = (kind, count);
        }
    }
    best.0
}

/// Normalizes a grading draft against the caller's rubric.
///
/// Every rubric criterion appears in both maps; scores clamp to the
/// criterion weight and the total clamps to the rubric maximum, so
/// `total_score <= max_score` holds by construction.
pub(crate) fn grading(draft: DraftEvaluation, rubric: &Rubric, raw: &str) -> GradingResult {
    let mut criterion_scores = BTreeMap::new();
    let mut criterion_feedback = BTreeMap::new();

    if rubric.is_empty() {
        for (name, score) in &draft.scores {
            criterion_scores.insert(name.clone(), clamp_score(Some(*score), DEFAULT_MAX_SCORE));
        }
        for (name, feedback) in &draft.criterion_feedback {
            criterion_feedback.insert(name.clone(), feedback.clone());
        }
        for name in criterion_scores.keys() {
            criterion_feedback
                .entry(name.clone())
                .or_insert_with(|| DEFAULT_FEEDBACK.to_string());
        }
    } else {
        for criterion in &rubric.criteria {
            criterion_scores.insert(
                criterion.name.clone(),
                clamp_score(draft.score_for(&criterion.name), criterion.max_points),
            );
            criterion_feedback.insert(
                criterion.name.clone(),
                draft
                    .feedback_for(&criterion.name)
                    .unwrap_or(DEFAULT_FEEDBACK)
                    .to_string(),
            );
        }
    }

    let max_score = if rubric.is_empty() {
        draft
            .max_score
            .filter(|max| max.is_finite() && *max > 0.0)
            .unwrap_or(DEFAULT_MAX_SCORE)
    } else {
        rubric.max_score()
    };

    let summed: f64 = criterion_scores.values().sum();
    let total = draft
        .total_score
        .or(if summed > 0.0 { Some(summed) } else { None });

    GradingResult {
        criterion_scores,
        criterion_feedback,
        overall_feedback: draft
            .overall_feedback
            .clone()
            .or_else(|| non_empty_text(raw))
            .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string()),
        total_score: clamp_score(total, max_score),
        max_score,
    }
}

/// Normalizes an essay-evaluation draft against the caller's rubric.
pub(crate) fn essay(draft: DraftEvaluation, rubric: &Rubric, raw: &str) -> EssayEvaluation {
    let names: Vec<String> = if rubric.is_empty() {
        let mut names: Vec<String> = Vec::new();
        let mentioned = draft
            .scores
            .iter()
            .map(|(name, _)| name)
            .chain(draft.criterion_feedback.iter().map(|(name, _)| name));
        for name in mentioned {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.clone());
            }
        }
        names
    } else {
        rubric.criteria.iter().map(|c| c.name.clone()).collect()
    };

    let criteria = names
        .into_iter()
        .map(|name| CriterionEvaluation {
            score: clamp_score(draft.score_for(&name), CRITERION_SCALE),
            feedback: draft
                .feedback_for(&name)
                .unwrap_or(DEFAULT_FEEDBACK)
                .to_string(),
            name,
        })
        .collect();

    let rubric_max = if rubric.is_empty() {
        DEFAULT_MAX_SCORE
    } else {
        rubric.max_score()
    };

    EssayEvaluation {
        criteria,
        overall_feedback: draft
            .overall_feedback
            .clone()
            .or_else(|| non_empty_text(raw))
            .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string()),
        strengths: non_empty_list(draft.strengths, &DEFAULT_STRENGTHS),
        areas_for_improvement: non_empty_list(draft.areas_for_improvement, &DEFAULT_AREAS),
        suggested_points: clamp_score(draft.suggested_points, rubric_max),
    }
}

/// Normalizes a feedback draft.
pub(crate) fn feedback(draft: DraftEvaluation, raw: &str) -> Feedback {
    Feedback {
        summary: draft
            .overall_feedback
            .clone()
            .or_else(|| non_empty_text(raw))
            .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string()),
        strengths: non_empty_list(draft.strengths, &DEFAULT_STRENGTHS),
        areas_for_improvement: non_empty_list(draft.areas_for_improvement, &DEFAULT_AREAS),
        suggestions: non_empty_list(draft.suggestions, &DEFAULT_SUGGESTIONS),
    }
}

fn non_empty_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Drops blank items; substitutes the fixed default list when nothing is
/// left.
fn non_empty_list(items: Vec<String>, defaults: &[&str; 2]) -> Vec<String> {
    let cleaned: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if cleaned.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RubricCriterion;

    fn lettered(pairs: &[(char, &str)]) -> DraftOptions {
        DraftOptions::Lettered(
            pairs
                .iter()
                .map(|(letter, text)| (*letter, text.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_question_assembly_multiple_choice() {
        let draft = DraftQuestion {
            text: "What is 2+2?".to_string(),
            options: lettered(&[('A', "3"), ('B', "4"), ('C', "5")]),
            answer: Some("B".to_string()),
            explanation: Some("Basic arithmetic".to_string()),
        };

        let question = question_from_draft(draft, None);
        assert_eq!(question.kind(), QuestionKind::MultipleChoice);
        assert_eq!(question.options(), vec!["3", "4", "5"]);
        assert_eq!(question.correct_answer(), Some("4"));
        assert_eq!(question.explanation, "Basic arithmetic");
    }

    #[test]
    fn test_missing_answer_becomes_placeholder() {
        let draft = DraftQuestion {
            text: "Pick one".to_string(),
            options: lettered(&[('A', "x"), ('B', "y")]),
            answer: None,
            explanation: None,
        };

        let question = question_from_draft(draft, None);
        match question.form {
            QuestionForm::MultipleChoice { correct_answer, .. } => {
                assert!(correct_answer.is_placeholder());
                assert_eq!(correct_answer.text(), DEFAULT_ANSWER);
            }
            other => panic!("expected multiple choice, got {other:?}"),
        }
        assert_eq!(question.explanation, DEFAULT_EXPLANATION);
    }

    #[test]
    fn test_true_false_from_lettered_options() {
        let draft = DraftQuestion {
            text: "The sun is a star.".to_string(),
            options: lettered(&[('A', "True"), ('B', "False")]),
            answer: Some("A".to_string()),
            explanation: None,
        };

        let question = question_from_draft(draft, None);
        assert_eq!(
            question.form,
            QuestionForm::TrueFalse {
                correct_answer: TruthValue::True
            }
        );
    }

    #[test]
    fn test_lone_option_salvaged_as_answer() {
        let draft = DraftQuestion {
            text: "Name the red planet.".to_string(),
            options: lettered(&[('A', "Mars")]),
            answer: None,
            explanation: None,
        };

        let question = question_from_draft(draft, None);
        assert_eq!(question.kind(), QuestionKind::ShortAnswer);
        assert_eq!(question.correct_answer(), Some("Mars"));
    }

    #[test]
    fn test_declared_kind_rejected_without_options() {
        let draft = DraftQuestion {
            text: "Name the largest planet.".to_string(),
            options: DraftOptions::default(),
            answer: Some("Jupiter".to_string()),
            explanation: None,
        };

        let question = question_from_draft(draft, Some(QuestionKind::MultipleChoice));
        assert_eq!(question.kind(), QuestionKind::ShortAnswer);
    }

    #[test]
    fn test_long_answer_folds_answer_into_explanation() {
        let draft = DraftQuestion {
            text: "Discuss the causes of World War I.".to_string(),
            options: DraftOptions::default(),
            answer: Some("Cover alliances and nationalism".to_string()),
            explanation: None,
        };

        let question = question_from_draft(draft, None);
        assert_eq!(question.form, QuestionForm::LongAnswer);
        assert_eq!(question.explanation, "Cover alliances and nationalism");
    }

    #[test]
    fn test_ordered_options_keep_order_and_cap() {
        let options: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        let draft = DraftQuestion {
            text: "Pick a number".to_string(),
            options: DraftOptions::Ordered(options),
            answer: Some("7".to_string()),
            explanation: None,
        };

        let question = question_from_draft(draft, None);
        let rendered = question.options();
        assert_eq!(rendered.len(), MAX_OPTIONS);
        assert_eq!(rendered[0], "1");
        // "7" is within the kept options, so it aligns by text.
        assert_eq!(question.correct_answer(), Some("7"));
        match question.form {
            QuestionForm::MultipleChoice { correct_answer, .. } => {
                assert!(!correct_answer.is_placeholder())
            }
            other => panic!("expected multiple choice, got {other:?}"),
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(Some(8.0), 10.0), 8.0);
        assert_eq!(clamp_score(Some(15.0), 10.0), 10.0);
        assert_eq!(clamp_score(Some(-3.0), 10.0), 0.0);
        assert_eq!(clamp_score(None, 10.0), 0.0);
        assert_eq!(clamp_score(Some(f64::NAN), 10.0), 0.0);
    }

    #[test]
    fn test_dominant_kind_tie_breaks_to_earliest() {
        let short = question_from_draft(
            DraftQuestion {
                text: "Short one".to_string(),
                ..Default::default()
            },
            None,
        );
        let tf = question_from_draft(
            DraftQuestion {
                text: "A claim.".to_string(),
                answer: Some("true".to_string()),
                ..Default::default()
            },
            None,
        );

        let questions = vec![short.clone(), tf.clone()];
        assert_eq!(dominant_kind(&questions), QuestionKind::ShortAnswer);

        let questions = vec![tf, short];
        assert_eq!(dominant_kind(&questions), QuestionKind::TrueFalse);
    }

    #[test]
    fn test_grading_keys_follow_rubric() {
        let rubric = Rubric::new(vec![
            RubricCriterion::new("Clarity", 10.0),
            RubricCriterion::new("Evidence", 10.0),
        ]);
        let draft = DraftEvaluation {
            scores: vec![("Clarity".to_string(), 12.0)],
            overall_feedback: Some("Decent".to_string()),
            ..Default::default()
        };

        let result = grading(draft, &rubric, "raw text");
        assert_eq!(result.criterion_scores["Clarity"], 10.0); // clamped to weight
        assert_eq!(result.criterion_scores["Evidence"], 0.0);
        assert_eq!(result.criterion_feedback["Evidence"], DEFAULT_FEEDBACK);
        assert_eq!(result.max_score, 20.0);
        assert_eq!(result.total_score, 10.0);
        assert!(result.total_score <= result.max_score);
    }

    #[test]
    fn test_grading_total_clamped_to_max() {
        let rubric = Rubric::new(vec![RubricCriterion::new("Only", 10.0)]);
        let draft = DraftEvaluation {
            total_score: Some(55.0),
            ..Default::default()
        };

        let result = grading(draft, &rubric, "");
        assert_eq!(result.total_score, 10.0);
        assert_eq!(result.overall_feedback, DEFAULT_FEEDBACK);
    }

    #[test]
    fn test_essay_defaults() {
        let rubric = Rubric::new(vec![RubricCriterion::new("Thesis", 50.0)]);
        let result = essay(DraftEvaluation::default(), &rubric, "raw evaluation text");

        assert_eq!(result.criteria.len(), 1);
        assert_eq!(result.criteria[0].score, 0.0);
        assert_eq!(result.strengths.len(), 2);
        assert_eq!(result.areas_for_improvement.len(), 2);
        assert_eq!(result.overall_feedback, "raw evaluation text");
        assert_eq!(result.suggested_points, 0.0);
    }

    #[test]
    fn test_essay_criterion_score_clamped_to_percent() {
        let rubric = Rubric::new(vec![RubricCriterion::new("Thesis", 50.0)]);
        let draft = DraftEvaluation {
            scores: vec![("Thesis".to_string(), 150.0)],
            suggested_points: Some(80.0),
            ..Default::default()
        };

        let result = essay(draft, &rubric, "");
        assert_eq!(result.criteria[0].score, 100.0);
        // Suggested points clamp to the rubric maximum, not the percent scale.
        assert_eq!(result.suggested_points, 50.0);
    }

    #[test]
    fn test_feedback_summary_falls_back_to_raw() {
        let result = feedback(DraftEvaluation::default(), "  the raw response  ");
        assert_eq!(result.summary, "the raw response");
        assert_eq!(result.suggestions.len(), 2);
    }
}
