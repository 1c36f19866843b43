use thiserror::Error;

/// Top-level error type for the tracker.
///
/// `Validation` and `Duplicate` carry user-facing text and are surfaced
/// verbatim as corrective/informational replies, never logged as failures.
/// `Store` and `Provider` are logged in detail; the user only ever sees a
/// generic message (store) or the deterministic fallback report (provider).
#[derive(Debug, Error)]
pub enum SamboError {
    /// A required external credential or id is absent. The dependent
    /// feature is disabled; the process keeps running.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed or out-of-range user input.
    #[error("{0}")]
    Validation(String),

    /// Idempotency guard triggered (same-day duplicate entry).
    #[error("{0}")]
    Duplicate(String),

    /// The remote tabular store rejected or timed out an operation.
    /// Never retried automatically.
    #[error("store error: {0}")]
    Store(String),

    /// The text-generation call failed or timed out.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
