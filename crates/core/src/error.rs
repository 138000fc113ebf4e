//! Error types for U-Molding.

use thiserror::Error;

/// Result type alias for U-Molding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during layout, scoring or partition search.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: mismatched counts, bad dimensions, out-of-range lookups.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geometry with no usable extent or mass (zero area, coincident points).
    ///
    /// Scorers recover from this locally; it is only surfaced by explicit
    /// validation calls.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Partition enumeration hit its configured cap in strict mode.
    #[error("Enumeration exceeded the limit of {limit} schemes")]
    EnumerationOverflow {
        /// The cap that was exceeded.
        limit: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,

    /// Timeout exceeded.
    #[error("Timeout exceeded after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true for errors the caller must treat as fatal input problems.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
