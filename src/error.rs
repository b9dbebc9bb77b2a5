//! Error types shared by every materna component.

use std::fmt;
use thiserror::Error;

/// Structured reason attached to a non-success response from a remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteReason {
    Quota,
    InvalidInput,
    Auth,
    Unavailable,
    Other,
}

impl RemoteReason {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            402 | 429 => Self::Quota,
            400 | 404 | 409 | 422 => Self::InvalidInput,
            500..=599 => Self::Unavailable,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for RemoteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Quota => "quota exceeded",
            Self::InvalidInput => "invalid input",
            Self::Auth => "authentication failed",
            Self::Unavailable => "service unavailable",
            Self::Other => "request failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum MaternaError {
    /// Camera or microphone access was refused.
    #[error("Camera or microphone access denied: {0}")]
    PermissionDenied(String),

    /// No matching capture device exists.
    #[error("No camera or microphone found: {0}")]
    DeviceNotFound(String),

    /// The remote endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote API error ({reason}): {message}")]
    RemoteApi {
        reason: RemoteReason,
        message: String,
    },

    /// Malformed user input, e.g. an empty note or out-of-range date.
    #[error("{0}")]
    Validation(String),

    /// Local audio or speech engine fault.
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation was superseded by a newer call or a close.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaternaError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            reason: RemoteReason::from_status(status),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for MaternaError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Self::remote(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            Self::RemoteApi {
                reason: RemoteReason::Other,
                message: e.to_string(),
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<sea_orm::DbErr> for MaternaError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<tokio::task::JoinError> for MaternaError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Storage(format!("Background task failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, MaternaError>;
