//! Error types for seraph-rs.

use std::fmt;

use serde_json::Value;

/// Alias for Results returning [`SeraphError`].
pub type Result<T> = std::result::Result<T, SeraphError>;

/// Top-level error type for seraph-rs.
///
/// `Clone` so that a single commit failure can be handed to every pending
/// callback of the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeraphError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Ambiguous reference: placeholder denotes {count} operations where one identifier is required")]
    AmbiguousReference { count: usize },

    #[error("Batch already committed")]
    BatchAlreadyCommitted,

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Service error: HTTP {status} ({class}): {message}")]
    Service {
        status: u16,
        class: StatusClass,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for SeraphError {
    fn from(err: serde_json::Error) -> Self {
        SeraphError::Serialization(err.to_string())
    }
}

impl SeraphError {
    /// Build a service error from a non-success status and the (optional) error body.
    ///
    /// The message is taken from the body's `message` field, then `exception`,
    /// falling back to the canonical reason for the status. A plain-text body
    /// is used as the message as is.
    pub fn service(status: u16, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|b| match b {
                Value::String(text) if !text.is_empty() => Some(text.as_str()),
                _ => b
                    .get("message")
                    .or_else(|| b.get("exception"))
                    .and_then(Value::as_str),
            })
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        SeraphError::Service {
            status,
            class: StatusClass::from_status(status),
            message,
        }
    }

    /// Status classifier of a service error, `None` for every other variant.
    pub fn status_class(&self) -> Option<StatusClass> {
        match self {
            SeraphError::Service { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_class() == Some(StatusClass::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        self.status_class() == Some(StatusClass::Conflict)
    }
}

/// Coarse classification of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Server,
    Other,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusClass::BadRequest,
            401 | 403 => StatusClass::Unauthorized,
            404 => StatusClass::NotFound,
            409 => StatusClass::Conflict,
            500..=599 => StatusClass::Server,
            _ => StatusClass::Other,
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusClass::BadRequest => "bad request",
            StatusClass::Unauthorized => "unauthorized",
            StatusClass::NotFound => "not found",
            StatusClass::Conflict => "conflict",
            StatusClass::Server => "server error",
            StatusClass::Other => "unexpected status",
        };
        f.write_str(label)
    }
}
