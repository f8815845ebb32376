//! Error types for generation requests.

use thiserror::Error;

/// Result type for generation requests.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors that can occur when calling the generation endpoints.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// One attempt failed: non-2xx status, transport failure or unparsable body.
    ///
    /// Only seen inside the retry loop; callers get [`GenerationError::RequestFailed`]
    /// once retries run out.
    #[error("transient request failure: {0}")]
    Transient(String),

    /// Every attempt failed.
    #[error("request failed after {attempts} attempts: {message}")]
    RequestFailed {
        /// HTTP status of the last attempt, if one was received.
        status: Option<u16>,
        /// Description of the last failure.
        message: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The response parsed but lacked the expected field.
    #[error("empty response: missing {0}")]
    EmptyResponse(&'static str),

    /// The image endpoint returned no usable images.
    #[error("no images returned")]
    NoImagesReturned,

    /// The configured API base URL is invalid.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    /// Returns true if this error is retryable (a single failed attempt).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
