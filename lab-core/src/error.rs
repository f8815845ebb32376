//! Error types for session operations.

use thiserror::Error;

/// Result type for core session operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while mutating session state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Gallery entry not found.
    #[error("Gallery entry not found: {0}")]
    EntryNotFound(String),

    /// A gallery entry reference could not be parsed.
    #[error("Invalid gallery entry id: {0}")]
    InvalidEntryId(String),

    /// State update serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
