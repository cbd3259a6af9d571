//! Recording mock of the registration API
//!
//! Every call is recorded in order before its reply is produced. Replies
//! are scripted per endpoint: queued one-off replies are used first, then
//! the endpoint's standing reply. Delays use `tokio::time::sleep`, so tests
//! running on a paused clock control exactly when responses land.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use registration_client::models::{
    AdminHealth, AggregatedProfile, BulkRetryReport, DlqEntry, ErrorLogEntry, ErrorLogQuery,
    FailedMessage, ManualRetryReceipt, OperatorIdentity, RegistrationReceipt,
    RegistrationRequest, RegistrationStatus, RetryStatus, RetrySuccessRate, StatsSnapshot,
};
use registration_client::{ClientError, ClientResult, ExportArtifact, RegistrationApi};

/// Calls observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    SubmitRegistration(String),
    GetAggregatedProfile(String),
    DownloadRegistrationXml(String),
    GetRegistrationStatus(String),
    GetStats,
    ListErrorLogs,
    SearchErrorLogs(Vec<(&'static str, String)>),
    ListFailedMessages,
    ListFailedMessagesByStatus(RetryStatus),
    ListDlqEntries,
    GetRetrySuccessRate,
    GetAdminHealth,
    ManualRetry {
        message_id: i64,
        operator: String,
        notes: String,
    },
    RetryAllDlq {
        operator: String,
        notes: String,
    },
}

/// Failure to produce; rebuilt into a fresh `ClientError` on each use
#[derive(Debug, Clone)]
pub enum Failure {
    Validation(Vec<String>),
    Business(String),
    Transport(String),
}

impl Failure {
    fn into_error(self, operation: &str) -> ClientError {
        match self {
            Failure::Validation(messages) => ClientError::Validation(messages),
            Failure::Business(message) => ClientError::business(Some(400), message),
            Failure::Transport(detail) => ClientError::transport(operation, detail),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub delay: Duration,
    pub result: Result<T, Failure>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(failure: Failure) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(failure),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replies for one endpoint
#[derive(Debug, Clone)]
pub struct Scripted<T> {
    queue: VecDeque<Reply<T>>,
    standing: Option<Reply<T>>,
}

impl<T> Default for Scripted<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            standing: None,
        }
    }
}

impl<T: Clone> Scripted<T> {
    /// Reply used whenever nothing is queued
    pub fn always(&mut self, reply: Reply<T>) {
        self.standing = Some(reply);
    }

    /// Reply used for the next call only
    pub fn then(&mut self, reply: Reply<T>) {
        self.queue.push_back(reply);
    }

    fn next(&mut self) -> Reply<T> {
        self.queue
            .pop_front()
            .or_else(|| self.standing.clone())
            .unwrap_or_else(|| Reply::err(Failure::Transport("no scripted reply".to_string())))
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<ApiCall>,
    pub submit: Scripted<RegistrationReceipt>,
    pub profile: Scripted<AggregatedProfile>,
    pub download: Scripted<ExportArtifact>,
    pub status: Scripted<RegistrationStatus>,
    pub stats: Scripted<StatsSnapshot>,
    pub error_logs: Scripted<Vec<ErrorLogEntry>>,
    pub failed_messages: Scripted<Vec<FailedMessage>>,
    pub dlq: Scripted<Vec<DlqEntry>>,
    pub success_rate: Scripted<RetrySuccessRate>,
    pub health: Scripted<AdminHealth>,
    pub manual_retry: Scripted<ManualRetryReceipt>,
    pub retry_all_dlq: Scripted<BulkRetryReport>,
}

/// Mock registration API for testing
#[derive(Debug, Clone, Default)]
pub struct MockRegistrationApi {
    state: Arc<Mutex<MockState>>,
}

impl MockRegistrationApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust scripted replies
    pub fn script<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn as_api(&self) -> Arc<dyn RegistrationApi> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls recorded after the first `skip`
    pub fn calls_since(&self, skip: usize) -> Vec<ApiCall> {
        self.calls().into_iter().skip(skip).collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    pub fn count_of(&self, call: &ApiCall) -> usize {
        self.count(|c| c == call)
    }

    async fn respond<T>(
        &self,
        call: ApiCall,
        operation: &str,
        pick: impl FnOnce(&mut MockState) -> Reply<T>,
    ) -> ClientResult<T> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            pick(&mut state)
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map_err(|f| f.into_error(operation))
    }
}

#[async_trait]
impl RegistrationApi for MockRegistrationApi {
    fn transport_name(&self) -> &'static str {
        "mock"
    }

    fn endpoint(&self) -> &str {
        "mock://registration"
    }

    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> ClientResult<RegistrationReceipt> {
        self.respond(
            ApiCall::SubmitRegistration(request.student_id.clone()),
            "POST /registrations/submit",
            |s| s.submit.next(),
        )
        .await
    }

    async fn get_aggregated_profile(&self, student_id: &str) -> ClientResult<AggregatedProfile> {
        self.respond(
            ApiCall::GetAggregatedProfile(student_id.to_string()),
            "GET /registrations/profile",
            |s| s.profile.next(),
        )
        .await
    }

    async fn download_registration_xml(&self, student_id: &str) -> ClientResult<ExportArtifact> {
        self.respond(
            ApiCall::DownloadRegistrationXml(student_id.to_string()),
            "GET /registrations/download-xml",
            |s| s.download.next(),
        )
        .await
    }

    async fn get_registration_status(
        &self,
        student_id: &str,
    ) -> ClientResult<RegistrationStatus> {
        self.respond(
            ApiCall::GetRegistrationStatus(student_id.to_string()),
            "GET /registrations/status",
            |s| s.status.next(),
        )
        .await
    }

    async fn get_stats(&self) -> ClientResult<StatsSnapshot> {
        self.respond(ApiCall::GetStats, "GET /admin/stats", |s| s.stats.next())
            .await
    }

    async fn list_error_logs(&self) -> ClientResult<Vec<ErrorLogEntry>> {
        self.respond(ApiCall::ListErrorLogs, "GET /admin/errors", |s| {
            s.error_logs.next()
        })
        .await
    }

    async fn search_error_logs(&self, query: &ErrorLogQuery) -> ClientResult<Vec<ErrorLogEntry>> {
        self.respond(
            ApiCall::SearchErrorLogs(query.query_pairs()),
            "GET /admin/errors/search",
            |s| s.error_logs.next(),
        )
        .await
    }

    async fn list_failed_messages(&self) -> ClientResult<Vec<FailedMessage>> {
        self.respond(
            ApiCall::ListFailedMessages,
            "GET /admin/failed-messages",
            |s| s.failed_messages.next(),
        )
        .await
    }

    async fn list_failed_messages_by_status(
        &self,
        status: RetryStatus,
    ) -> ClientResult<Vec<FailedMessage>> {
        self.respond(
            ApiCall::ListFailedMessagesByStatus(status),
            "GET /admin/failed-messages/status",
            |s| s.failed_messages.next(),
        )
        .await
    }

    async fn list_dlq_entries(&self) -> ClientResult<Vec<DlqEntry>> {
        self.respond(
            ApiCall::ListDlqEntries,
            "GET /admin/failed-messages/dlq",
            |s| s.dlq.next(),
        )
        .await
    }

    async fn get_retry_success_rate(&self) -> ClientResult<RetrySuccessRate> {
        self.respond(
            ApiCall::GetRetrySuccessRate,
            "GET /admin/stats/retry-success-rate",
            |s| s.success_rate.next(),
        )
        .await
    }

    async fn get_admin_health(&self) -> ClientResult<AdminHealth> {
        self.respond(ApiCall::GetAdminHealth, "GET /admin/health", |s| {
            s.health.next()
        })
        .await
    }

    async fn manual_retry(
        &self,
        message_id: i64,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<ManualRetryReceipt> {
        self.respond(
            ApiCall::ManualRetry {
                message_id,
                operator: operator.to_string(),
                notes: notes.to_string(),
            },
            "POST /admin/retry",
            |s| s.manual_retry.next(),
        )
        .await
    }

    async fn retry_all_dlq(
        &self,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<BulkRetryReport> {
        self.respond(
            ApiCall::RetryAllDlq {
                operator: operator.to_string(),
                notes: notes.to_string(),
            },
            "POST /admin/retry-all-dlq",
            |s| s.retry_all_dlq.next(),
        )
        .await
    }
}
