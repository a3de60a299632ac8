//! Tier 2: recover a document embedded in surrounding prose.
//!
//! Models frequently wrap a valid document in commentary ("Sure! Here is
//! the quiz you asked for: { ... } Let me know if..."). This tier cuts the
//! commentary away and retries strict decoding on the span, which is far
//! cheaper than the heuristic tiers below it.

use crate::error::{TierError, TierResult};

/// Returns the substring spanning the first `{` to the **last** `}` in the
/// input.
///
/// This is a deliberate full-span match, not balanced-brace matching. When a
/// response carries two independent documents the span covers both, the
/// redecode fails, and the input falls through to the heuristic tiers; a
/// balanced matcher would instead silently pick the first document and hide
/// the ambiguity.
pub(crate) fn document_span(input: &str) -> TierResult<&str> {
    let start = input.find('{').ok_or(TierError::NoEmbeddedDocument)?;
    let end = input
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or(TierError::NoEmbeddedDocument)?;

    Ok(&input[start..=end])
}
