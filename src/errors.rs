use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, warn};

/// Where a failure happened, which decides how the view recovers from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Launch data missing or rejected. Fatal for the session.
    Initialization,
    /// A read failed. The view offers a retry that repeats the same fetch.
    Fetch,
    /// Enroll, complete, submit, retake or request-video failed. Reported inline.
    Mutation,
    /// A secondary read failed while the primary one succeeded.
    PartialData,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String), // 401

    #[error("Forbidden: {0}")]
    Forbidden(String), // 403

    #[error("Not Found: {0}")]
    NotFound(String), // 404

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Maps a non-success HTTP status and the backend's message onto a variant.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::Backend {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Text safe to show to a learner. Never contains a status code.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Initialization(message) | AppError::Validation(message) => message.clone(),
            AppError::Unauthorized(_) => {
                "Your session has expired. Please reopen the app from Telegram.".to_string()
            }
            AppError::Forbidden(message) | AppError::NotFound(message) => {
                if message.is_empty() {
                    "This content is not available.".to_string()
                } else {
                    message.clone()
                }
            }
            AppError::Backend { message, .. } => {
                if message.is_empty() {
                    "Something went wrong. Please try again.".to_string()
                } else {
                    message.clone()
                }
            }
            AppError::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AppError::Decode(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Transport(_) => true,
            AppError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// An error tagged with the recovery class of the call that raised it.
#[derive(Debug, Error)]
#[error("{kind:?} failure: {source}")]
pub struct ViewError {
    pub kind: ErrorKind,
    #[source]
    pub source: AppError,
}

impl ViewError {
    pub fn new(kind: ErrorKind, source: AppError) -> Self {
        match kind {
            ErrorKind::PartialData => warn!("Degrading view after {:?}", source),
            _ => error!("{:?} failure: {:?}", kind, source),
        }
        ViewError { kind, source }
    }

    pub fn user_message(&self) -> String {
        match (self.kind, &self.source) {
            (ErrorKind::Fetch, AppError::Transport(_)) => {
                "Failed to load data. Tap to try again.".to_string()
            }
            _ => self.source.user_message(),
        }
    }

    /// A retry action is offered only for failed reads the backend may still serve.
    pub fn offers_retry(&self) -> bool {
        self.kind == ErrorKind::Fetch && !matches!(self.source, AppError::Forbidden(_))
    }
}
