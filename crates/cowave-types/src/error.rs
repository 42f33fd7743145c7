use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of everything that can go wrong between the UI and the
/// backend. The kind drives caller behavior (retry, sign-in prompt, silent
/// success for conflicts); the message is pre-composed for direct display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input, caught before any remote call.
    Validation,
    /// The backend denied the operation.
    Permission,
    /// A uniqueness constraint was violated.
    Conflict,
    /// The network is unreachable.
    Offline,
    /// A backend usage policy rejected the request (quotas, rate limits).
    Quota,
    /// Anything else.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DataError {
    pub kind: ErrorKind,
    pub message: String,
}

pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn offline() -> Self {
        Self::new(
            ErrorKind::Offline,
            "You appear to be offline. Check your connection and try again.",
        )
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Quota, message)
    }

    /// Wraps an unclassified backend failure: readable prefix for the user,
    /// raw detail appended for diagnostics.
    pub fn unknown(doing: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Unknown,
            format!("Something went wrong while {doing}. ({detail})"),
        )
    }
}
