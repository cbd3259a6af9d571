// Category and status enumerations shared by the registration flow and the
// recovery console. Pure data: no presentation mapping lives here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error Category
///
/// Why a registration stage failed, as classified by the server. Used for
/// filtering the error log and for the frequency maps in stats snapshots.
/// Names the server does not send today decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Service temporarily unavailable
    SystemDown,
    /// Network communication failure
    NetworkTimeout,
    /// Invalid data format or validation error
    InvalidData,
    /// Database operation failed
    DatabaseError,
    /// Message queue operation failed
    QueueError,
    /// Message translation failed
    TranslationError,
    /// Routing logic failed
    RoutingError,
    /// Aggregation process failed
    AggregationError,
    /// Uncategorized
    #[serde(other)]
    Unknown,
}

impl ErrorCategory {
    /// All categories in server declaration order
    pub const ALL: [ErrorCategory; 9] = [
        Self::SystemDown,
        Self::NetworkTimeout,
        Self::InvalidData,
        Self::DatabaseError,
        Self::QueueError,
        Self::TranslationError,
        Self::RoutingError,
        Self::AggregationError,
        Self::Unknown,
    ];

    /// Wire representation, also used as the `category` query parameter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SystemDown => "SYSTEM_DOWN",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::InvalidData => "INVALID_DATA",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::QueueError => "QUEUE_ERROR",
            Self::TranslationError => "TRANSLATION_ERROR",
            Self::RoutingError => "ROUTING_ERROR",
            Self::AggregationError => "AGGREGATION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid error category '{}'. Valid: {}",
                    s,
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// Retry Status
///
/// Lifecycle of a failed message as driven by the server's retry scheduler
/// and by operator commands. The client observes it; it never writes it.
///
/// State Machine:
/// - `PENDING_RETRY` → `RETRYING`
/// - `RETRYING` → `RETRY_SUCCESS` | `MOVED_TO_DLQ`
/// - `MOVED_TO_DLQ` → `AWAITING_MANUAL_RETRY`
/// - `AWAITING_MANUAL_RETRY` → `MANUAL_RETRY_SUCCESS` | `FAILED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryStatus {
    PendingRetry,
    Retrying,
    RetrySuccess,
    MovedToDlq,
    AwaitingManualRetry,
    ManualRetrySuccess,
    Failed,
}

impl RetryStatus {
    pub const ALL: [RetryStatus; 7] = [
        Self::PendingRetry,
        Self::Retrying,
        Self::RetrySuccess,
        Self::MovedToDlq,
        Self::AwaitingManualRetry,
        Self::ManualRetrySuccess,
        Self::Failed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingRetry => "PENDING_RETRY",
            Self::Retrying => "RETRYING",
            Self::RetrySuccess => "RETRY_SUCCESS",
            Self::MovedToDlq => "MOVED_TO_DLQ",
            Self::AwaitingManualRetry => "AWAITING_MANUAL_RETRY",
            Self::ManualRetrySuccess => "MANUAL_RETRY_SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Check if this status ended in success
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::RetrySuccess | Self::ManualRetrySuccess)
    }

    /// Check if no further transition can happen
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::RetrySuccess | Self::ManualRetrySuccess | Self::Failed
        )
    }

    /// Check if an operator retry command applies to a message in this status
    #[must_use]
    pub const fn awaits_operator(self) -> bool {
        matches!(self, Self::MovedToDlq | Self::AwaitingManualRetry)
    }

    /// Whether `next` is a legal successor of `self`
    ///
    /// Staying in the same status is always legal.
    #[must_use]
    pub fn can_transition_to(self, next: RetryStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::PendingRetry, Self::Retrying)
                | (Self::Retrying, Self::RetrySuccess)
                | (Self::Retrying, Self::MovedToDlq)
                | (Self::MovedToDlq, Self::AwaitingManualRetry)
                | (Self::AwaitingManualRetry, Self::ManualRetrySuccess)
                | (Self::AwaitingManualRetry, Self::Failed)
        )
    }
}

impl fmt::Display for RetryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RetryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Invalid retry status: {}", s))
    }
}

/// Aggregation Status
///
/// Open set: the aggregator may report states this client does not know
/// about, which are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregationStatus {
    Pending,
    Partial,
    Complete,
    Timeout,
    Other(String),
}

impl AggregationStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Partial => "PARTIAL",
            Self::Complete => "COMPLETE",
            Self::Timeout => "TIMEOUT",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for AggregationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<String> for AggregationStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PARTIAL" => Self::Partial,
            "COMPLETE" => Self::Complete,
            "TIMEOUT" => Self::Timeout,
            _ => Self::Other(raw),
        }
    }
}

impl From<AggregationStatus> for String {
    fn from(status: AggregationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AggregationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
