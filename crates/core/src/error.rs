use thiserror::Error;

/// Failure reported by a forum platform collaborator.
///
/// The core never retries these; they are surfaced per post so a pass can
/// move on to the next one.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("rate limited by the platform")]
    RateLimited,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("platform returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum CurateError {
    /// A target was requested without an elapsed-time value or a post to
    /// derive one from.
    #[error("target requires either adjusted minutes or a post")]
    MissingTargetInput,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type Result<T, E = CurateError> = std::result::Result<T, E>;
