//! Error types for the quark_transfer crate.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Step of the transfer workflow an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Auth,
    Detail,
    Save,
    Cleanup,
    Share,
    Browse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Auth => "auth",
            Stage::Detail => "detail",
            Stage::Save => "save",
            Stage::Cleanup => "cleanup",
            Stage::Share => "share",
            Stage::Browse => "browse",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while transferring shares into the drive.
#[derive(Error, Debug)]
pub enum QuarkError {
    #[error("Invalid share URL: {0}")]
    InvalidShareUrl(String),

    #[error("HTTP request failed during {stage}: {source}")]
    Http {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error during {stage} ({status}): {message}")]
    Api {
        stage: Stage,
        status: i64,
        message: String,
    },

    #[error("Unexpected response during {stage}: {message}")]
    UnexpectedResponse { stage: Stage, message: String },

    #[error("Task {task_id} did not finish during {stage} after {attempts} polls ({elapsed:?})")]
    TaskTimeout {
        stage: Stage,
        task_id: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Record store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuarkError {
    pub(crate) fn http(stage: Stage, source: reqwest::Error) -> Self {
        QuarkError::Http { stage, source }
    }

    pub(crate) fn unexpected(stage: Stage, message: impl Into<String>) -> Self {
        QuarkError::UnexpectedResponse {
            stage,
            message: message.into(),
        }
    }

    /// Workflow step the error was raised in, if it came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            QuarkError::InvalidShareUrl(_) => Some(Stage::Parse),
            QuarkError::Http { stage, .. }
            | QuarkError::Api { stage, .. }
            | QuarkError::UnexpectedResponse { stage, .. }
            | QuarkError::TaskTimeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the error aborts a transfer.
    ///
    /// Record store failures and ad cleanup failures leave the remote
    /// transfer intact and are only logged.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, QuarkError::Store(_)) && self.stage() != Some(Stage::Cleanup)
    }
}

/// Result type alias for QuarkError.
pub type Result<T> = std::result::Result<T, QuarkError>;
