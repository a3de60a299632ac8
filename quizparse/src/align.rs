//! Dense alignment of lettered options and answer resolution.

use crate::model::Answer;

/// Number of letter slots recognized by lettered extraction (A through D).
const SLOTS: usize = 4;

/// Reconciles `(letter, text)` pairs gathered in arbitrary order into a
/// dense, letter-ordered option list.
///
/// Missing intermediate letters are skipped, not null-padded: the output
/// length equals the count of letters actually seen. Duplicate letters keep
/// the last occurrence. Options with empty text are dropped before indexing.
///
/// # Examples
///
/// ```
/// use quizparse::align::align_options;
///
/// let pairs = vec![('C', "x".to_string()), ('A', "y".to_string())];
/// assert_eq!(align_options(&pairs), vec!["y", "x"]);
/// ```
pub fn align_options(pairs: &[(char, String)]) -> Vec<String> {
    let mut slots: [Option<String>; SLOTS] = Default::default();

    for (letter, text) in pairs {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Some(idx) = slot_index(*letter) {
            slots[idx] = Some(text.to_string());
        }
    }

    slots.into_iter().flatten().collect()
}

/// Resolves a raw answer value against the extracted options.
///
/// A bare letter (`B`, `b)`, `Option C`) resolves to that letter's option
/// text; a textual answer equal to one of the options (case-insensitively)
/// resolves to the option's canonical text. Anything else is kept verbatim
/// but flagged as a placeholder.
pub fn resolve_answer(raw: &str, pairs: &[(char, String)], options: &[String]) -> Answer {
    let trimmed = raw.trim();

    if let Some(letter) = answer_letter(trimmed) {
        // Last occurrence wins, mirroring align_options.
        let resolved = pairs
            .iter()
            .rev()
            .find(|(l, text)| l.eq_ignore_ascii_case(&letter) && !text.trim().is_empty())
            .map(|(_, text)| text.trim().to_string());
        if let Some(text) = resolved {
            return Answer::Aligned(text);
        }
        return Answer::Placeholder(trimmed.to_string());
    }

    if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(trimmed)) {
        return Answer::Aligned(option.clone());
    }

    Answer::Placeholder(trimmed.to_string())
}

/// Extracts a lone option letter from answer text like `B`, `b.`, `(C)`,
/// or `Option D`.
fn answer_letter(raw: &str) -> Option<char> {
    let mut s = raw.trim();

    let lower = s.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("option") {
        s = s[s.len() - rest.len()..].trim_start();
    }

    let s = s
        .trim_start_matches('(')
        .trim_end_matches(&['.', ')', ':'][..])
        .trim();

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if slot_index(c).is_some() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

fn slot_index(letter: char) -> Option<usize> {
    match letter.to_ascii_uppercase() {
        'A' => Some(0),
        'B' => Some(1),
        'C' => Some(2),
        'D' => Some(3),
        _ => None,
    }
}
