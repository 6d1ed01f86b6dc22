use mf_editor::SnapshotError;
use mf_render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Shown when the backend gives no usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("session expired")]
    SessionExpired,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Text for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Validation(message) => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl StudioError {
    pub fn user_message(&self) -> String {
        match self {
            StudioError::Api(e) => e.user_message(),
            StudioError::Snapshot(e) => e.to_string(),
            StudioError::Render(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },
}
