//! Error classification shared by every domain error.

use serde::Serialize;

/// Coarse classification of a domain failure.
///
/// Every module keeps its own precise error enum; `kind()` on each of them
/// maps into this so callers can decide between fixing input, refreshing
/// their view, retrying, or escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input was rejected; nothing changed.
    Validation,
    /// The operation conflicts with the current state of a record.
    StateConflict,
    /// A lock could not be acquired in time; the caller may retry.
    Contention,
    /// The operation was aborted to protect consistency.
    Integrity,
    /// A referenced record does not exist.
    NotFound,
}

impl ErrorKind {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::Contention => "contention",
            Self::Integrity => "integrity",
            Self::NotFound => "not_found",
        }
    }

    /// Returns true if retrying the same call unchanged may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
