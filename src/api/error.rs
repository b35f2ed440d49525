//! Normalized failure type shared by every API command.

use thiserror::Error;

/// Fixed message for a rejected pre-signed transfer.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file to storage";

/// Every way a command can fail. Exactly one of these is returned per call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, TLS, reset, body read).
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success status whose body is not the declared shape.
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    /// A non-success status. `message` is the backend's own message when the
    /// error body carried one, otherwise `HTTP Error: <status>`.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A pre-signed object storage transfer was rejected.
    #[error("Failed to upload file to storage")]
    Upload { status: Option<u16> },
}

/// Coarse classification for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Application,
    Upload,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Http { .. } => ErrorKind::Application,
            ApiError::Upload { .. } => ErrorKind::Upload,
        }
    }

    /// HTTP status, when the backend (or storage) answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode { .. } => None,
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Upload { status } => *status,
        }
    }

    /// Caller-facing text. For application failures this is exactly the
    /// backend message.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}
