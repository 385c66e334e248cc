use thiserror::Error;
use twintone_core::TwinToneError;

/// Failure category reported by a generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    /// The backend answered successfully but produced no text.
    EmptyResponse,
}

/// Error from one generation call.
///
/// `retryable` is set by the constructor for each kind and is what
/// [`RetryPolicy`](crate::RetryPolicy) consults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Unavailable, message, true)
    }

    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::EmptyResponse, message, false)
    }
}

impl From<GenerationError> for TwinToneError {
    fn from(err: GenerationError) -> Self {
        TwinToneError::Generation(err.to_string())
    }
}
