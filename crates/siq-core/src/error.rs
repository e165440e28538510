//! Error types for siq

use thiserror::Error;

/// siq error type
///
/// Every operation validates its inputs before building an index or drawing
/// an emulation set, so an `Err` means no partial computation took place.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed domain bounds (min >= max, non-finite, or zero dimensions)
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Non-positive sample or emulation count
    #[error("invalid count: {0}")]
    InvalidCount(String),

    /// Zero-length reference set passed to index construction
    #[error("empty reference set: {0}")]
    EmptyReferenceSet(String),

    /// Paired inputs of unequal length or dimension
    #[error("mismatched lengths: {0}")]
    MismatchedLengths(String),

    /// Grid-only operation given samples that do not form a regular grid
    #[error("not a regular grid: {0}")]
    NotAGrid(String),

    /// Density weights that cannot be normalized to a probability
    #[error("unnormalizable weights: {0}")]
    UnnormalizedWeights(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
