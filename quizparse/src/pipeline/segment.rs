//! Tier 3: pattern-rule segmentation of quiz text.
//!
//! An ordered list of label rules is tried in turn; the first rule that
//! yields at least one usable segment wins. Each segment body then goes
//! through inline field extraction, which works even when an entire
//! question — options, answer, and explanation included — sits on one line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::draft::{DraftOptions, DraftQuestion};
use crate::error::{TierError, TierResult};

/// Rule 1: line-leading "Question 3" / "Q3" labels. Anchored to line starts
/// so prose that merely mentions "question 2" does not split a segment.
static QUESTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*[*#]*[ \t]*(?:question|q)[ \t]*\.?[ \t]*\d+[ \t]*[:.)\-]?\s*")
        .expect("invalid question label")
});

/// Rule 2: line-leading "3." / "3)" labels.
static NUMBER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+[ \t]*[.)]\s*").expect("invalid number label"));

/// Inline option markers: `A.` `B)` `C:` `(D)` and `Option A` forms.
static OPTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[\s(])(?:option\s+)?([a-d])[.):]\s*").expect("invalid option marker")
});

/// `Answer:` / `Correct answer:` label.
static ANSWER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:correct\s+answer|answer)\b\s*[:\-]\s*").expect("invalid answer label")
});

/// `Explanation:` label.
static EXPLANATION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bexplanation\b\s*[:\-]\s*").expect("invalid explanation label"));

/// Splits raw text into question drafts using the ordered label rules.
///
/// Returns `NoStructure` when no rule produces a usable segment, handing
/// the text to the line-heuristic tier.
pub(crate) fn segment(input: &str) -> TierResult<Vec<DraftQuestion>> {
    for rule in [&*QUESTION_LABEL, &*NUMBER_LABEL] {
        let drafts = split_by(rule, input);
        if !drafts.is_empty() {
            return Ok(drafts);
        }
    }

    Err(TierError::NoStructure)
}

/// Cuts the input at each label match; the body of a segment runs from the
/// end of its label to the start of the next. Empty bodies are discarded.
fn split_by(rule: &Regex, input: &str) -> Vec<DraftQuestion> {
    let labels: Vec<_> = rule.find_iter(input).collect();
    let mut drafts = Vec::new();

    for (i, label) in labels.iter().enumerate() {
        let body_end = labels.get(i + 1).map_or(input.len(), |next| next.start());
        let body = input[label.end()..body_end].trim();
        if body.is_empty() {
            continue;
        }
        drafts.push(parse_segment(body));
    }

    drafts
}

/// Inline field extraction over one segment body.
///
/// Layout assumption, matching how models format questions: prompt first,
/// then options, then the answer label, then the explanation label. The
/// prompt is whatever precedes the first structural marker.
fn parse_segment(body: &str) -> DraftQuestion {
    let answer_label = ANSWER_LABEL.find(body);
    let explanation_label = EXPLANATION_LABEL.find(body);

    let answer_start = answer_label.as_ref().map(|m| m.start());
    let explanation_start = explanation_label.as_ref().map(|m| m.start());

    let explanation = explanation_label
        .map(|m| body[m.end()..].trim().to_string())
        .filter(|s| !s.is_empty());

    let answer = answer_label
        .map(|m| {
            let end = explanation_start
                .filter(|start| *start > m.end())
                .unwrap_or(body.len());
            body[m.end()..end].trim().to_string()
        })
        .filter(|s| !s.is_empty());

    // Options and prompt live before whichever label comes first.
    let head_end = [answer_start, explanation_start]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(body.len());
    let head = &body[..head_end];

    let markers: Vec<_> = OPTION_MARKER.captures_iter(head).collect();
    let mut options = DraftOptions::default();
    for (i, capture) in markers.iter().enumerate() {
        let letter = capture[1]
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('A');
        let text_start = capture.get(0).map(|m| m.end()).unwrap_or(0);
        let text_end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(head.len(), |m| m.start());
        options.push_letter(letter, head[text_start..text_end].trim().to_string());
    }

    let text_end = markers
        .first()
        .and_then(|capture| capture.get(0))
        .map_or(head.len(), |m| m.start());

    DraftQuestion {
        text: head[..text_end].trim().to_string(),
        options,
        answer,
        explanation,
    }
}
