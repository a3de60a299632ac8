//! End-to-end quiz extraction tests.
//!
//! These exercise the full cascade through the public API: strict decoding,
//! embedded-document recovery, segmentation, line heuristics, and the
//! normalization/validation guarantees on whatever comes out.

use pretty_assertions::assert_eq;
use quizparse::{extract_quiz, QuestionForm, QuestionKind, Tier};

#[test]
fn well_formed_document_uses_only_the_first_tier() {
    let input = r#"{
        "title": "Photosynthesis",
        "subject": "Biology",
        "topic": "Plant biology",
        "difficulty": "Easy",
        "questions": [
            {
                "question": "What gas do plants absorb?",
                "options": ["Oxygen", "Carbon dioxide", "Nitrogen"],
                "correctAnswer": "Carbon dioxide",
                "explanation": "CO2 is fixed during the Calvin cycle."
            }
        ]
    }"#;

    let extraction = extract_quiz(input);
    assert_eq!(extraction.tier, Tier::StrictDecode);
    assert_eq!(extraction.confidence(), 1.0);

    let quiz = extraction.value;
    assert_eq!(quiz.title, "Photosynthesis");
    assert_eq!(quiz.subject, "Biology");
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(
        quiz.questions[0].correct_answer(),
        Some("Carbon dioxide")
    );
}

#[test]
fn embedded_document_equals_decoding_the_span_alone() {
    let document = r#"{"questions": [{"question": "What is H2O?", "answer": "Water"}]}"#;
    let wrapped = format!("Of course! Here is the quiz:\n\n{document}\n\nLet me know if you need more.");

    let from_wrapped = extract_quiz(&wrapped);
    let from_span = extract_quiz(document);

    assert_eq!(from_wrapped.tier, Tier::EmbeddedDocument);
    assert_eq!(from_span.tier, Tier::StrictDecode);
    assert_eq!(from_wrapped.value, from_span.value);
}

#[test]
fn segmented_text_with_mixed_kinds() {
    let input = "\
Question 1: What is 2+2? A) 3 B) 4 C) 5 Answer: B Explanation: Basic arithmetic
Question 2: The earth is flat. Answer: False
Question 3: The capital of France is ____. Answer: Paris";

    let extraction = extract_quiz(input);
    assert_eq!(extraction.tier, Tier::Segmentation);

    let quiz = extraction.value;
    assert_eq!(quiz.questions.len(), 3);

    let kinds: Vec<QuestionKind> = quiz.questions.iter().map(|q| q.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::MultipleChoice,
            QuestionKind::TrueFalse,
            QuestionKind::FillBlank,
        ]
    );

    let ids: Vec<u32> = quiz.questions.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(quiz.questions[0].options(), vec!["3", "4", "5"]);
    assert_eq!(quiz.questions[0].correct_answer(), Some("4"));
    assert_eq!(quiz.questions[1].correct_answer(), Some("False"));
    assert_eq!(quiz.questions[2].correct_answer(), Some("Paris"));
}

#[test]
fn numbered_blocks_resolve_through_segmentation() {
    let input = "\
World Capitals Quiz:

1. Capital of Japan?
A) Kyoto
B) Tokyo
Answer: B
Explanation: Tokyo has been the capital since 1868.

2. Capital of Australia?
A) Sydney
B) Canberra
Answer: B";

    let extraction = extract_quiz(input);
    // Numbered lines are segment labels, so segmentation wins here.
    assert_eq!(extraction.tier, Tier::Segmentation);

    let quiz = extraction.value;
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.question_type, QuestionKind::MultipleChoice);
    assert_eq!(quiz.questions[0].correct_answer(), Some("Tokyo"));
    assert_eq!(quiz.questions[1].correct_answer(), Some("Canberra"));
}

#[test]
fn unlabeled_answer_lines_fall_to_line_heuristics() {
    let input = "\
Quick check:
Answer: True
Explanation: The statement in the prompt holds.";

    let extraction = extract_quiz(input);
    assert_eq!(extraction.tier, Tier::LineHeuristic);

    let quiz = extraction.value;
    assert_eq!(quiz.title, "Quick check");
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].kind(), QuestionKind::TrueFalse);
}

#[test]
fn long_answer_question_through_the_pipeline() {
    let input = "1. Discuss the role of mitochondria in cellular respiration, covering both \
the electron transport chain and ATP synthesis in detail.";

    let quiz = extract_quiz(input).value;
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].kind(), QuestionKind::LongAnswer);
    assert_eq!(quiz.questions[0].correct_answer(), None);
}

#[test]
fn dominant_kind_reflects_majority() {
    let input = "\
1. A or B? A) a B) b Answer: A
2. C or D? A) c B) d Answer: B
3. Name one planet. Answer: Mars";

    let quiz = extract_quiz(input).value;
    assert_eq!(quiz.question_type, QuestionKind::MultipleChoice);
}

#[test]
fn missing_explanations_get_the_placeholder() {
    let input = "1. What is 3*3? Answer: 9";
    let quiz = extract_quiz(input).value;

    assert_eq!(quiz.questions[0].explanation, "No explanation provided");
}

#[test]
fn round_trip_is_stable() {
    // Re-extracting the serialized output must reproduce it exactly.
    let inputs = [
        "1. What is 2+2? A) 3 B) 4 C) 5 Answer: B Explanation: Basic arithmetic",
        "Question 1: The moon orbits the earth. Answer: True",
        "1. The boiling point of water is ____ degrees Celsius. Answer: 100",
        r#"{"title": "T", "subject": "S", "topic": "P", "difficulty": "Hard",
            "questions": [{"question": "Why?", "explanation": "Because."}]}"#,
    ];

    for input in inputs {
        let first = extract_quiz(input).value;
        let serialized = serde_json::to_string(&first).expect("quiz serializes");
        let second = extract_quiz(&serialized).value;
        assert_eq!(first, second, "round trip diverged for input: {input}");
    }
}

#[test]
fn fenced_document_short_circuits() {
    let input = "```json\n{\"questions\": [{\"question\": \"Name a noble gas.\", \"answer\": \"Neon\"}]}\n```";

    let extraction = extract_quiz(input);
    assert_eq!(extraction.tier, Tier::StrictDecode);
    assert_eq!(extraction.value.questions[0].correct_answer(), Some("Neon"));
}

#[test]
fn fenced_document_with_prose_uses_embedded_tier() {
    let input = "\
Here's the quiz you requested:

```json
{\"questions\": [{\"question\": \"Name a noble gas.\", \"answer\": \"Neon\"}]}
```
";

    let extraction = extract_quiz(input);
    assert_eq!(extraction.tier, Tier::EmbeddedDocument);
    assert_eq!(extraction.value.questions[0].correct_answer(), Some("Neon"));
}

#[test]
fn option_gaps_are_dropped_not_padded() {
    let input = "1. Pick one\nA) alpha\nC) gamma\nAnswer: C";
    let quiz = extract_quiz(input).value;

    match &quiz.questions[0].form {
        QuestionForm::MultipleChoice {
            options,
            correct_answer,
        } => {
            assert_eq!(options, &vec!["alpha".to_string(), "gamma".to_string()]);
            assert_eq!(correct_answer.text(), "gamma");
            assert!(!correct_answer.is_placeholder());
        }
        other => panic!("expected multiple choice, got {other:?}"),
    }
}
