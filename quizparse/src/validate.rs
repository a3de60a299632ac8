//! Final structural gate before a quiz is handed back to the caller.
//!
//! Guarantees that can only be checked once the whole question sequence is
//! known live here: at least one question, dense 1-based ids, no blank
//! prompts. The rubric-shaped kinds get their structural guarantees from
//! their single construction path in [`crate::normalize`], so only the quiz
//! needs a separate gate. Never raises — a structurally empty document is
//! replaced by a synthesized placeholder, not rejected.

use crate::model::{Question, QuestionForm, Quiz};
use crate::normalize::{self, DEFAULT_ANSWER, DEFAULT_EXPLANATION};
use crate::pipeline::draft::QuizMeta;

/// Finalizes a quiz: synthesis when empty, dense ids, prompt and
/// explanation backstops, metadata defaults.
pub(crate) fn finalize_quiz(meta: QuizMeta, mut questions: Vec<Question>, raw: &str) -> Quiz {
    if questions.is_empty() {
        questions.push(placeholder_question(raw));
    }

    for (index, question) in questions.iter_mut().enumerate() {
        question.id = (index + 1) as u32;
        if question.text.trim().is_empty() {
            question.text = format!("Question {}", question.id);
        }
        if question.explanation.trim().is_empty() {
            question.explanation = DEFAULT_EXPLANATION.to_string();
        }
    }

    normalize::quiz(meta, questions)
}

/// The placeholder emitted when every tier came up empty: a single
/// short-answer question carrying the entire raw text, with normalizer
/// defaults for everything else.
fn placeholder_question(raw: &str) -> Question {
    Question {
        id: 1,
        text: raw.trim().to_string(),
        explanation: DEFAULT_EXPLANATION.to_string(),
        form: QuestionForm::ShortAnswer {
            correct_answer: DEFAULT_ANSWER.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;
    use crate::normalize::question_from_draft;
    use crate::pipeline::draft::DraftQuestion;

    #[test]
    fn test_empty_quiz_synthesizes_placeholder() {
        let quiz = finalize_quiz(QuizMeta::default(), Vec::new(), "some raw model output");

        assert_eq!(quiz.questions.len(), 1);
        let question = &quiz.questions[0];
        assert_eq!(question.id, 1);
        assert_eq!(question.text, "some raw model output");
        assert_eq!(question.kind(), QuestionKind::ShortAnswer);
        assert_eq!(question.explanation, DEFAULT_EXPLANATION);
        assert_eq!(question.correct_answer(), Some(DEFAULT_ANSWER));
    }

    #[test]
    fn test_empty_raw_text_still_yields_question() {
        let quiz = finalize_quiz(QuizMeta::default(), Vec::new(), "");

        assert_eq!(quiz.questions.len(), 1);
        // A blank prompt is backstopped with a positional label.
        assert_eq!(quiz.questions[0].text, "Question 1");
    }

    #[test]
    fn test_ids_are_dense_from_one() {
        let questions: Vec<_> = ["first", "second", "third"]
            .iter()
            .map(|text| {
                question_from_draft(
                    DraftQuestion {
                        text: text.to_string(),
                        ..Default::default()
                    },
                    None,
                )
            })
            .collect();

        let quiz = finalize_quiz(QuizMeta::default(), questions, "");
        let ids: Vec<u32> = quiz.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_metadata_defaults_applied() {
        let quiz = finalize_quiz(QuizMeta::default(), Vec::new(), "x");
        assert_eq!(quiz.title, "Untitled Quiz");
        assert_eq!(quiz.subject, "General");
        assert_eq!(quiz.topic, "General");
        assert_eq!(quiz.difficulty, "Medium");
    }
}
