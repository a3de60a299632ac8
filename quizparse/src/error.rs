//! Internal failure taxonomy for the extraction cascade.
//!
//! Every variant here is recovered *inside* the pipeline — by falling through
//! to the next tier, or ultimately by placeholder synthesis in the validator.
//! Nothing in this module crosses the crate boundary; the public entry points
//! are infallible.

/// Result type alias for tier-level operations.
pub(crate) type TierResult<T> = std::result::Result<T, TierError>;

/// Failures raised by a single tier of the cascade.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TierError {
    /// Strict decoding of the payload failed at the syntax level.
    #[error("document decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The payload decoded, but not into the shape the kind requires.
    #[error("payload does not match the expected {0} shape")]
    WrongShape(&'static str),

    /// No `{` ... `}` span exists in the payload.
    #[error("no embedded document span found")]
    NoEmbeddedDocument,

    /// No segmentation pattern produced a usable segment.
    #[error("no segmentation pattern matched")]
    NoStructure,

    /// Heuristics ran to completion without recovering a single record.
    #[error("extraction produced no usable records")]
    EmptyExtraction,
}
