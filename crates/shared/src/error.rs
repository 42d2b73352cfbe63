use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Blocked before any request was sent.
    Validation,
    /// Server answered `success: false`.
    Rejected,
    /// Non-OK status or the request never completed.
    Transport,
    /// Another row is already being edited.
    Guard,
    /// Unknown row or field, or an action not available in the row's mode.
    Usage,
}

/// A failed user action, carrying the message that was shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the server may have seen the request.
    pub fn reached_server(&self) -> bool {
        matches!(self.kind, ErrorKind::Rejected | ErrorKind::Transport)
    }
}
