//! # Recovery Console Models
//!
//! Operational datasets read by the admin console (error log, failed
//! messages, dead-letter queue, stats) and the results of the retry
//! commands. All of these are server-owned; the client only reads them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::taxonomy::{ErrorCategory, RetryStatus};

/// Identity the console acts as when issuing retry commands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorIdentity(String);

impl OperatorIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the server's error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub id: i64,
    #[serde(default)]
    pub error_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    pub error_stage: String,
    pub error_category: ErrorCategory,
    pub error_message: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub resolved: bool,
}

fn default_severity() -> String {
    "ERROR".to_string()
}

/// A registration that failed somewhere in the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedMessage {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    #[serde(default)]
    pub failed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub failure_stage: Option<String>,
    #[serde(default = "default_category")]
    pub error_category: ErrorCategory,
    #[serde(default)]
    pub error_message: Option<String>,
    pub status: RetryStatus,
    #[serde(default)]
    pub retry_attempts: u32,
    #[serde(default)]
    pub max_retry_attempts: u32,
    #[serde(default)]
    pub next_retry_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_retry_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub retried_by: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

fn default_category() -> ErrorCategory {
    ErrorCategory::Unknown
}

impl FailedMessage {
    /// Next automatic retry, only meaningful while the server still owns retries
    #[must_use]
    pub fn scheduled_retry(&self) -> Option<NaiveDateTime> {
        if self.status == RetryStatus::PendingRetry {
            self.next_retry_at
        } else {
            None
        }
    }

    /// Attempts left before the server gives up and moves it to the DLQ
    #[must_use]
    pub fn remaining_attempts(&self) -> u32 {
        self.max_retry_attempts.saturating_sub(self.retry_attempts)
    }
}

/// A failed message parked in the dead-letter queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqEntry {
    #[serde(flatten)]
    pub message: FailedMessage,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub moved_to_dlq_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_retry_history")]
    pub retry_history: Vec<RetryHistoryEntry>,
}

/// One prior attempt from a message's retry log
///
/// The server writes lines shaped like
/// `[2025-03-01 10:15:30] Attempt 2: FAILED - Scheduling next retry in 30 seconds`.
/// Lines that do not follow that shape keep only `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryHistoryEntry {
    pub recorded_at: Option<NaiveDateTime>,
    pub attempt: Option<u32>,
    pub outcome: Option<String>,
    pub details: Option<String>,
    pub raw: String,
}

impl RetryHistoryEntry {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let raw = line.trim().to_string();
        let mut entry = Self {
            recorded_at: None,
            attempt: None,
            outcome: None,
            details: None,
            raw: raw.clone(),
        };

        let Some(rest) = raw.strip_prefix('[') else {
            return entry;
        };
        let Some((timestamp, rest)) = rest.split_once(']') else {
            return entry;
        };
        entry.recorded_at =
            NaiveDateTime::parse_from_str(timestamp.trim(), "%Y-%m-%d %H:%M:%S").ok();

        let Some(rest) = rest.trim().strip_prefix("Attempt ") else {
            return entry;
        };
        let Some((attempt, rest)) = rest.split_once(':') else {
            return entry;
        };
        entry.attempt = attempt.trim().parse().ok();

        match rest.trim().split_once(" - ") {
            Some((outcome, details)) => {
                entry.outcome = Some(outcome.trim().to_string());
                entry.details = Some(details.trim().to_string());
            }
            None if !rest.trim().is_empty() => entry.outcome = Some(rest.trim().to_string()),
            None => {}
        }
        entry
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRetryHistory {
    Text(String),
    Lines(Vec<String>),
    Entries(Vec<RetryHistoryEntry>),
}

fn deserialize_retry_history<'de, D>(deserializer: D) -> Result<Vec<RetryHistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawRetryHistory>::deserialize(deserializer)?;
    let entries = match raw {
        None => Vec::new(),
        Some(RawRetryHistory::Text(text)) => text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(RetryHistoryEntry::parse)
            .collect(),
        Some(RawRetryHistory::Lines(lines)) => lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| RetryHistoryEntry::parse(line))
            .collect(),
        Some(RawRetryHistory::Entries(entries)) => entries,
    };
    Ok(entries)
}

/// Server-aggregated counters for the overview tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(default)]
    pub total_failed_messages: u64,
    #[serde(default)]
    pub messages_in_dlq: u64,
    #[serde(default)]
    pub pending_retry: u64,
    #[serde(default)]
    pub retry_success: u64,
    #[serde(default)]
    pub total_errors: u64,
    #[serde(default)]
    pub unresolved_errors: u64,
    #[serde(default)]
    pub awaiting_manual_retry: u64,
    #[serde(default)]
    pub manual_retry_success: u64,
    #[serde(default)]
    pub retrying: Option<u64>,
    #[serde(default)]
    pub failed: Option<u64>,
    #[serde(default)]
    pub errors_by_category: BTreeMap<String, u64>,
    #[serde(default)]
    pub errors_by_stage: BTreeMap<String, u64>,
    #[serde(default)]
    pub errors_by_severity: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub failures_by_category: Option<BTreeMap<String, u64>>,
}

impl StatsSnapshot {
    #[must_use]
    pub fn category_count(&self, category: ErrorCategory) -> u64 {
        self.errors_by_category
            .get(category.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Stage with the most recorded failures, ties broken by name
    #[must_use]
    pub fn busiest_stage(&self) -> Option<(&str, u64)> {
        self.errors_by_stage
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(stage, count)| (stage.as_str(), *count))
    }
}

/// Query for `GET /admin/errors/search`
///
/// The console only ever sets `category` and `stage`; the remaining
/// criteria are accepted by the server and exposed for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLogQuery {
    pub category: Option<ErrorCategory>,
    pub stage: Option<String>,
    pub severity: Option<String>,
    pub resolved: Option<bool>,
    pub student_id: Option<String>,
}

impl ErrorLogQuery {
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.query_pairs().is_empty()
    }

    /// Non-empty criteria as query parameters, in a stable order
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        let text_criteria = [
            ("stage", &self.stage),
            ("severity", &self.severity),
            ("studentId", &self.student_id),
        ];
        for (name, value) in text_criteria {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((name, value.to_string()));
            }
        }
        if let Some(resolved) = self.resolved {
            pairs.push(("resolved", resolved.to_string()));
        }
        pairs
    }
}

/// Response of `POST /admin/retry/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRetryReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub retried_by: Option<String>,
}

/// Response of `POST /admin/retry-all-dlq`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRetryReport {
    pub total_messages: u64,
    pub success_count: u64,
    pub failure_count: u64,
}

/// Response of `GET /admin/stats/retry-success-rate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySuccessRate {
    pub total_messages: u64,
    pub resolved_messages: u64,
    pub messages_in_dlq: u64,
    pub success_rate: String,
    pub dlq_rate: String,
}

/// Response of `GET /admin/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminHealth {
    pub status: String,
    #[serde(default)]
    pub admin_dashboard: Option<String>,
    #[serde(default)]
    pub error_tracking: Option<String>,
    #[serde(default)]
    pub retry_scheduler: Option<String>,
}

impl AdminHealth {
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}
