//! # Client Error Types
//!
//! Unified error handling for the registration client library and CLI.
//!
//! Every failure the orchestration layer can observe is folded into
//! [`ClientError`], and every `ClientError` maps onto one of the four
//! [`ErrorKind`]s. Downstream code switches on the kind rather than on which
//! optional fields a server payload happened to carry.

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Closed classification of client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Server-reported per-field problems
    Validation,
    /// Server rejected the operation semantically; its message is shown verbatim
    Business,
    /// Connectivity or serialization failure
    Transport,
    /// Rejected locally before any request was issued
    Local,
}

/// Comprehensive error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{message}")]
    Business {
        status: Option<u16>,
        message: String,
    },

    #[error("{context}: {detail}")]
    Transport { context: String, detail: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A registration submission is already in progress")]
    SubmissionInFlight,

    #[error("Operation not available: {0}")]
    NotReady(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    /// Create a business error carrying the server's message verbatim
    pub fn business(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Business {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error with raw detail
    pub fn transport(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            detail: detail.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Taxonomy bucket for this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Business { .. } => ErrorKind::Business,
            ClientError::Transport { .. }
            | ClientError::HttpError(_)
            | ClientError::SerializationError(_)
            | ClientError::IoError(_) => ErrorKind::Transport,
            ClientError::ConfigError(_)
            | ClientError::InvalidInput(_)
            | ClientError::SubmissionInFlight
            | ClientError::NotReady(_) => ErrorKind::Local,
        }
    }

    /// Raw detail for transport-class errors
    fn transport_detail(&self) -> String {
        match self {
            ClientError::Transport { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Message suitable for the acting user or operator
    ///
    /// `action` names what was attempted ("submit registration", "retry
    /// message") and is only used for transport failures, which otherwise
    /// carry no human context.
    #[must_use]
    pub fn user_message(&self, action: &str) -> String {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Business | ErrorKind::Local => self.to_string(),
            ErrorKind::Transport => {
                format!("Failed to {}: {}", action, self.transport_detail())
            }
        }
    }

    /// Check if error came from the network rather than from the server's judgement
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}
