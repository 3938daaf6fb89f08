use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a video URL")]
    EmptyLocator,

    #[error("Invalid video URL: {0}")]
    InvalidLocator(String),

    /// Error text reported by the server, kept verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),

    #[error("Image error: {0}")]
    Image(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) => AppError::Rejected(message),
            other => AppError::Transport(other.to_string()),
        }
    }
}
