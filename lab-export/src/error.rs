//! Export error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while producing a document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The document could not be assembled or serialized.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// An embedded image could not be decoded.
    #[error("Image decode failed: {0}")]
    ImageDecode(String),
}
