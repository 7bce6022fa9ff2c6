use thiserror::Error;

/// Extraction failures surfaced to the caller. Structural misses on the
/// identity and term fields are recovered locally with documented defaults
/// and never reach this enum; only the subject table can fail a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Every subject strategy yielded zero rows on a document that does
    /// parse as markup. Reported instead of fabricating grades so the
    /// caller can show "results unavailable" rather than a fake transcript.
    #[error("no subjects found in document")]
    NoSubjectsFound,

    /// The input has no recognizable markup structure and no raw-text
    /// fallback matched either.
    #[error("document is not recognizable markup")]
    MalformedDocument,
}
