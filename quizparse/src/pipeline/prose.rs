//! Tiers 3/4 specialized for rubric-shaped prose.
//!
//! Grading results, feedback, and essay evaluations share one segment
//! grammar: labeled sections (`Strengths:`, `Areas for improvement:`,
//! `Overall:`), per-criterion score lines (`Clarity: 8/10 — crisp prose`),
//! and total/suggested-points labels. The segmentation level only accepts
//! those explicit patterns; the line-scan level below it takes anything it
//! can get — loose numbers near criterion names, bare bullet lists, plain
//! paragraphs as overall feedback.

use once_cell::sync::Lazy;
use regex::Regex;

use super::draft::DraftEvaluation;
use crate::error::{TierError, TierResult};
use crate::model::Rubric;

/// Section headings recognized at line starts.
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*[*#\-–•]*[ \t]*(strengths?|areas?\s+for\s+improvement|improvements?|weakness(?:es)?|suggestions?|next\s+steps|overall(?:\s+feedback)?|summary)\b[ \t]*[:\-]?[ \t]*(.*)$",
    )
    .expect("invalid heading pattern")
});

/// Bullet markers: `-`, `*`, `•`, or `1.` / `1)`.
static BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])[ \t]*(.*)$").expect("invalid bullet pattern")
});

/// A score fragment: optional `Score:` label, a number, an optional `/max`.
static SCORE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:score\b[ \t]*[:\-]?[ \t]*)?(-?\d+(?:\.\d+)?)(?:\s*/\s*(\d+(?:\.\d+)?))?")
        .expect("invalid score pattern")
});

/// `Total: 15/20` / `Total score - 15` anywhere in the text.
static TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btotal(?:\s+score)?\b[^\d\n]{0,20}(\d+(?:\.\d+)?)(?:\s*/\s*(\d+(?:\.\d+)?))?")
        .expect("invalid total pattern")
});

/// `Suggested points: 78` / `Recommended score: 12/20`.
static SUGGESTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:suggested|recommended)\s+(?:points?|score|grade)\b[^\d\n]{0,20}(\d+(?:\.\d+)?)",
    )
    .expect("invalid suggested pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Strengths,
    Areas,
    Suggestions,
    Overall,
}

/// Segmentation level: explicit labeled structure only.
///
/// Returns `NoStructure` when nothing matched, handing the text to
/// [`line_scan`].
pub(crate) fn segment_sections(input: &str, rubric: &Rubric) -> TierResult<DraftEvaluation> {
    let mut draft = DraftEvaluation::default();
    let mut found = false;

    found |= labeled_criterion_lines(input, rubric, &mut draft);
    found |= collect_sections(input, rubric, &mut draft);
    found |= totals(input, &mut draft);

    if !found {
        return Err(TierError::NoStructure);
    }
    Ok(draft)
}

/// Line-scan level: loose recovery when no labeled structure exists.
///
/// Every line lands somewhere — criterion mentions feed scores and
/// feedback, bullets are sorted into the three lists by keyword, and
/// everything else accumulates as overall feedback. `EmptyExtraction`
/// only fires when not even that recovered text.
pub(crate) fn line_scan(input: &str, rubric: &Rubric) -> TierResult<DraftEvaluation> {
    let mut draft = DraftEvaluation::default();
    let mut overall = String::new();

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut consumed = false;
        for criterion in &rubric.criteria {
            if contains_ignore_case(line, &criterion.name) {
                if let Some((score, _)) = first_score(line) {
                    draft.scores.push((criterion.name.clone(), score));
                }
                draft
                    .criterion_feedback
                    .push((criterion.name.clone(), line.to_string()));
                consumed = true;
            }
        }
        if consumed {
            continue;
        }

        if let Some(capture) = BULLET.captures(line) {
            let item = capture[1].trim().to_string();
            if !item.is_empty() {
                push_classified(&mut draft, item);
                continue;
            }
        }

        if !overall.is_empty() {
            overall.push(' ');
        }
        overall.push_str(line);
    }

    totals(input, &mut draft);
    if !overall.is_empty() {
        draft.overall_feedback = Some(overall);
    }

    if draft.scores.is_empty()
        && draft.criterion_feedback.is_empty()
        && draft.strengths.is_empty()
        && draft.areas_for_improvement.is_empty()
        && draft.suggestions.is_empty()
        && draft.overall_feedback.is_none()
    {
        return Err(TierError::EmptyExtraction);
    }
    Ok(draft)
}

/// `Clarity: 8/10 — crisp prose` lines, one per rubric criterion.
fn labeled_criterion_lines(input: &str, rubric: &Rubric, draft: &mut DraftEvaluation) -> bool {
    let mut found = false;

    for criterion in &rubric.criteria {
        let pattern = format!(
            r"(?im)^\s*[*#\-–•]*[ \t]*{}\b[ \t]*(?:\(([^)\n]*)\))?[ \t]*[:\-–][ \t]*(.*)$",
            regex::escape(&criterion.name)
        );
        let Ok(rule) = Regex::new(&pattern) else {
            continue;
        };
        let Some(capture) = rule.captures(input) else {
            continue;
        };

        // The score may sit in a parenthetical after the name or lead the
        // remainder; the rest of the line is the criterion's feedback.
        let parenthetical = capture.get(1).map(|m| m.as_str()).unwrap_or("");
        let remainder = capture.get(2).map(|m| m.as_str()).unwrap_or("").trim();

        // A "/10" here is the criterion's own scale, not the document
        // total, so it never feeds max_score.
        let mut feedback = remainder.to_string();
        let score = if let Some((score, _)) = first_score(parenthetical) {
            Some(score)
        } else if let Some(fragment) = SCORE_FRAGMENT.find(remainder) {
            let (score, _) = parse_fragment(fragment.as_str());
            let mut rest = String::new();
            rest.push_str(&remainder[..fragment.start()]);
            rest.push_str(&remainder[fragment.end()..]);
            feedback = rest;
            score
        } else {
            None
        };

        if let Some(score) = score {
            draft.scores.push((criterion.name.clone(), score));
            found = true;
        }

        let feedback = feedback
            .trim_matches(|c: char| c.is_whitespace() || "—–-.,:;()".contains(c))
            .to_string();
        if !feedback.is_empty() {
            draft
                .criterion_feedback
                .push((criterion.name.clone(), feedback));
            found = true;
        }
    }

    found
}

/// Collects bullet items under recognized section headings.
fn collect_sections(input: &str, rubric: &Rubric, draft: &mut DraftEvaluation) -> bool {
    let mut found = false;
    let mut section = Section::None;
    let mut overall = String::new();

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(capture) = HEADING.captures(line) {
            section = section_of(&capture[1]);
            found = true;
            let rest = capture[2].trim();
            if !rest.is_empty() {
                push_item(draft, section, rest, &mut overall);
            }
            continue;
        }

        // Score-bearing label lines belong to the criterion/total scans,
        // not to whatever section happens to be open.
        if TOTAL.is_match(line) || SUGGESTED.is_match(line) || is_criterion_label(line, rubric) {
            continue;
        }

        if section != Section::None {
            let content = BULLET
                .captures(line)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_else(|| line.to_string());
            if !content.is_empty() {
                push_item(draft, section, &content, &mut overall);
            }
        }
    }

    if !overall.is_empty() {
        draft.overall_feedback = Some(overall);
    }
    found
}

fn totals(input: &str, draft: &mut DraftEvaluation) -> bool {
    let mut found = false;

    if draft.total_score.is_none() {
        if let Some(capture) = TOTAL.captures(input) {
            draft.total_score = capture[1].parse().ok();
            if let Some(max) = capture.get(2) {
                draft.max_score = max.as_str().parse().ok();
            }
            found = draft.total_score.is_some();
        }
    }

    if draft.suggested_points.is_none() {
        if let Some(capture) = SUGGESTED.captures(input) {
            draft.suggested_points = capture[1].parse().ok();
            found |= draft.suggested_points.is_some();
        }
    }

    found
}

fn section_of(heading: &str) -> Section {
    let lower = heading.to_lowercase();
    if lower.starts_with("strength") {
        Section::Strengths
    } else if lower.starts_with("area") || lower.starts_with("improvement") || lower.starts_with("weakness") {
        Section::Areas
    } else if lower.starts_with("suggestion") || lower.starts_with("next") {
        Section::Suggestions
    } else {
        Section::Overall
    }
}

fn push_item(draft: &mut DraftEvaluation, section: Section, item: &str, overall: &mut String) {
    match section {
        Section::Strengths => draft.strengths.push(item.to_string()),
        Section::Areas => draft.areas_for_improvement.push(item.to_string()),
        Section::Suggestions => draft.suggestions.push(item.to_string()),
        Section::Overall => {
            if !overall.is_empty() {
                overall.push(' ');
            }
            overall.push_str(item);
        }
        Section::None => {}
    }
}

/// Sorts a bare bullet into the most plausible list by keyword.
fn push_classified(draft: &mut DraftEvaluation, item: String) {
    let lower = item.to_lowercase();
    if lower.contains("improve")
        || lower.contains("weak")
        || lower.contains("work on")
        || lower.contains("lack")
    {
        draft.areas_for_improvement.push(item);
    } else if lower.contains("suggest")
        || lower.contains("consider")
        || lower.contains("recommend")
        || lower.contains("try ")
    {
        draft.suggestions.push(item);
    } else {
        draft.strengths.push(item);
    }
}

fn first_score(text: &str) -> Option<(f64, Option<f64>)> {
    let fragment = SCORE_FRAGMENT.find(text)?;
    let (score, max) = parse_fragment(fragment.as_str());
    score.map(|s| (s, max))
}

fn parse_fragment(fragment: &str) -> (Option<f64>, Option<f64>) {
    let Some(capture) = SCORE_FRAGMENT.captures(fragment) else {
        return (None, None);
    };
    let score = capture.get(1).and_then(|m| m.as_str().parse().ok());
    let max = capture.get(2).and_then(|m| m.as_str().parse().ok());
    (score, max)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when the line opens with a rubric criterion name used as a label.
fn is_criterion_label(line: &str, rubric: &Rubric) -> bool {
    let stripped = line
        .trim_start_matches(|c: char| c.is_whitespace() || "*#-–•".contains(c))
        .to_lowercase();
    rubric
        .criteria
        .iter()
        .any(|criterion| stripped.starts_with(&criterion.name.to_lowercase()))
}
