use thiserror::Error;

/// Failure classes for calls against the VisaPath platform API.
///
/// `Validation` is deliberately separate from `Server`: forms render
/// their own field-level errors, so validation failures must never reach
/// the generic toast path.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Validation { message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    Envelope(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
