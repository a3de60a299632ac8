//! Tier 4: line-oriented reconstruction of questions.
//!
//! Runs when no segmentation rule matched. A single pass over the non-empty
//! trimmed lines drives an explicit two-state machine; the transition rules
//! are a fixed priority list, and the final "otherwise" rule accepts every
//! line unconditionally. Nothing is ever dropped and nothing can panic,
//! whatever the line looks like.

use once_cell::sync::Lazy;
use regex::Regex;

use super::draft::DraftQuestion;
use crate::error::{TierError, TierResult};

/// Leading numeral: `3.` / `3)` / `3:`.
static NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[ \t]*[.):][ \t]*(.*)$").expect("invalid numeral rule"));

/// Leading lettered option marker: `A.` / `B)` / `C:` / `(D)` / `Option A`.
static OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:option\s+)?\(?([a-d])[.):][ \t]*(.*)$").expect("invalid option rule")
});

/// Leading `Answer` / `Correct answer` label.
static ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:correct\s+answer|answer)\b[ \t]*[:\-]?[ \t]*(.*)$")
        .expect("invalid answer rule")
});

/// Leading `Explanation` label.
static EXPLANATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*explanation\b[ \t]*[:\-]?[ \t]*(.*)$").expect("invalid explanation rule")
});

/// Parser state: either between questions or inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No question open. Prose lines buffer as preamble; a marker line
    /// opens an implicit question so the line is not lost.
    Seeking,
    /// Building the current question's buffers.
    Accumulating,
}

/// Result of a line-heuristic pass.
#[derive(Debug, Default)]
pub(crate) struct LineParse {
    /// Title candidate taken from preamble text before the first question.
    pub title: Option<String>,
    pub drafts: Vec<DraftQuestion>,
}

/// Single-pass state machine over the text's non-empty trimmed lines.
#[derive(Debug)]
pub(crate) struct LineParser {
    state: State,
    current: DraftQuestion,
    preamble: Vec<String>,
    drafts: Vec<DraftQuestion>,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            state: State::Seeking,
            current: DraftQuestion::default(),
            preamble: Vec::new(),
            drafts: Vec::new(),
        }
    }

    /// Parses the whole input. `EmptyExtraction` means not a single
    /// question opened — the caller falls through to placeholder synthesis.
    pub fn parse(mut self, input: &str) -> TierResult<LineParse> {
        for raw in input.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            self.step(line);
        }

        self.emit_open();

        if self.drafts.is_empty() {
            return Err(TierError::EmptyExtraction);
        }

        Ok(LineParse {
            title: self.title_candidate(),
            drafts: self.drafts,
        })
    }

    /// One transition. Rules are checked in priority order; the final
    /// branch matches unconditionally.
    fn step(&mut self, line: &str) {
        if let Some(capture) = NUMERAL.captures(line) {
            self.emit_open();
            self.current.text = capture[1].trim().to_string();
            self.state = State::Accumulating;
            return;
        }

        if let Some(capture) = OPTION.captures(line) {
            self.open_implicit();
            let letter = capture[1]
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('A');
            self.current
                .options
                .push_letter(letter, capture[2].trim().to_string());
            return;
        }

        if let Some(capture) = ANSWER.captures(line) {
            self.open_implicit();
            self.current.answer = Some(capture[1].trim().to_string());
            return;
        }

        if let Some(capture) = EXPLANATION.captures(line) {
            self.open_implicit();
            self.current.explanation = Some(capture[1].trim().to_string());
            return;
        }

        // Unmatched line: route to the most recently opened buffer.
        match self.state {
            State::Seeking => self.preamble.push(line.to_string()),
            State::Accumulating => {
                if let Some(explanation) = &mut self.current.explanation {
                    append_line(explanation, line);
                } else if let Some(last_option) = self.current.options.last_text_mut() {
                    append_line(last_option, line);
                } else {
                    append_line(&mut self.current.text, line);
                }
            }
        }
    }

    /// Emits the current question if one is open, resetting the buffers.
    fn emit_open(&mut self) {
        if self.state == State::Accumulating {
            let draft = std::mem::take(&mut self.current);
            if !draft.is_empty() {
                self.drafts.push(draft);
            }
        }
        self.state = State::Seeking;
    }

    /// Opens an implicit question for a marker line seen while seeking.
    fn open_implicit(&mut self) {
        if self.state == State::Seeking {
            self.state = State::Accumulating;
        }
    }

    fn title_candidate(&self) -> Option<String> {
        self.preamble
            .first()
            .map(|line| line.trim_end_matches(':').trim().to_string())
            .filter(|line| !line.is_empty())
    }
}

fn append_line(buffer: &mut String, line: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(line);
}
