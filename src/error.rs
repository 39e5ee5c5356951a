//! Error types for NeuroEase
//!
//! Validation failures are reported synchronously to the caller. Cache storage
//! problems never show up here: the cache degrades to misses instead.

use thiserror::Error;

/// Rejected rating input. No state changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required identifier was empty or whitespace
    #[error("missing required identifier: {0}")]
    EmptyIdentifier(&'static str),

    /// Community ratings are integers from 1 to 5
    #[error("community rating must be an integer from 1 to 5, got {0}")]
    CommunityOutOfRange(i64),

    /// Effectiveness ratings are finite reals from 0 to 1
    #[error("effectiveness rating must be between 0 and 1, got {0}")]
    EffectivenessOutOfRange(f64),

    /// The running count for a subject is already at its maximum
    #[error("rating count for '{0}' cannot grow any further")]
    CountExhausted(String),

    /// Raw input could not be parsed as a number
    #[error("rating is not a number: '{0}'")]
    NotANumber(String),
}

/// Errors from the local rating store used by the binary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store file holds an invalid rating: {0}")]
    Invalid(#[from] ValidationError),
}

/// Failure to determine reachability. Callers treat it as offline.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("reachability request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Top-level error for the command-line binary
#[derive(Debug, Error)]
pub enum NeuroEaseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("no usable directory for {0}; pass it explicitly")]
    NoDirectory(&'static str),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
