use thiserror::Error;

/// Errors produced by the public operations in this crate.
///
/// Internal algorithm code never returns an error for malformed input it
/// controls itself; an out-of-bounds index caused by a broken internal
/// invariant is left as a panic rather than folded into this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested [`Algorithm`](crate::Algorithm) tag does not name a
    /// known algorithm. Never produced internally; only the public API
    /// surfaces this (e.g. when an algorithm tag is deserialized from an
    /// untrusted source).
    #[error("unsupported diff algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A cooperative cancellation signal was observed while computing a
    /// diff or merge. Propagated unchanged through every recursive layer.
    #[error("operation was cancelled")]
    Cancelled,

    /// Reading from a streaming input to feed the interner failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The options passed to [`merge`](crate::merge) or
    /// [`has_conflict`](crate::has_conflict) were mutually inconsistent.
    #[error("invalid merge options: {0}")]
    InvalidOptions(String),
}

/// Convenience alias for the `Result` type returned by this crate's public
/// operations.
pub type Result<T> = std::result::Result<T, Error>;
