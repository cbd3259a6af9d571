//! # Admin Recovery Controller
//!
//! Tab-scoped, timer-refreshed acquisition of the recovery console's
//! datasets: stats, error logs, failed messages and the dead-letter queue.
//!
//! Two triggers refresh data. The background timer refreshes stats plus
//! the active tab's dataset every `refresh_interval`. Tab and filter changes
//! refresh the active tab immediately. Both may overlap; each dataset's
//! [`Versioned`] wrapper drops whichever response is older than the one
//! already committed.
//!
//! Refresh failures are logged and leave the previous data on screen.

use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::retry::RetryOrchestrator;
use super::sequence::{RequestTicket, Versioned};
use crate::config::ConsoleConfig;
use crate::error::ClientResult;
use crate::models::{
    DlqEntry, ErrorCategory, ErrorLogEntry, ErrorLogQuery, FailedMessage, OperatorIdentity,
    StatsSnapshot,
};
use crate::timer::{RepeatingTask, Scheduler, TimerHandle};
use crate::transport::RegistrationApi;

/// Console tab; exactly one is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConsoleTab {
    #[default]
    Overview,
    ErrorLogs,
    FailedMessages,
    Dlq,
}

impl ConsoleTab {
    pub const ALL: [ConsoleTab; 4] = [
        Self::Overview,
        Self::ErrorLogs,
        Self::FailedMessages,
        Self::Dlq,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::ErrorLogs => "errors",
            Self::FailedMessages => "failed",
            Self::Dlq => "dlq",
        }
    }

    /// Dataset shown on this tab; Overview only shows stats, which refresh anyway
    #[must_use]
    pub const fn dataset(self) -> Option<Dataset> {
        match self {
            Self::Overview => None,
            Self::ErrorLogs => Some(Dataset::ErrorLogs),
            Self::FailedMessages => Some(Dataset::FailedMessages),
            Self::Dlq => Some(Dataset::Dlq),
        }
    }
}

impl fmt::Display for ConsoleTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsoleTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "overview" | "stats" => Ok(Self::Overview),
            "errors" | "errorlogs" | "logs" => Ok(Self::ErrorLogs),
            "failed" | "failedmessages" => Ok(Self::FailedMessages),
            "dlq" | "deadletter" | "deadletterqueue" => Ok(Self::Dlq),
            other => Err(format!("Unknown console tab: {}", other)),
        }
    }
}

/// Independently refreshed console dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Stats,
    ErrorLogs,
    FailedMessages,
    Dlq,
}

impl Dataset {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::ErrorLogs => "error_logs",
            Self::FailedMessages => "failed_messages",
            Self::Dlq => "dlq",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the console for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSnapshot {
    pub active_tab: ConsoleTab,
    pub category_filter: Option<ErrorCategory>,
    pub stage_filter: Option<String>,
    pub stats: Option<StatsSnapshot>,
    pub error_logs: Vec<ErrorLogEntry>,
    pub failed_messages: Vec<FailedMessage>,
    pub dlq_entries: Vec<DlqEntry>,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ConsoleState {
    active_tab: ConsoleTab,
    category_filter: Option<ErrorCategory>,
    stage_filter: Option<String>,
    stats: Versioned<Option<StatsSnapshot>>,
    error_logs: Versioned<Vec<ErrorLogEntry>>,
    failed_messages: Versioned<Vec<FailedMessage>>,
    dlq: Versioned<Vec<DlqEntry>>,
    in_flight_loads: usize,
    refresh_timer: Option<TimerHandle>,
}

impl ConsoleState {
    fn error_log_query(&self) -> ErrorLogQuery {
        ErrorLogQuery {
            category: self.category_filter,
            stage: self.stage_filter.clone(),
            ..Default::default()
        }
    }

    /// Snapshot the filters and claim the next error-log ticket together
    fn issue_error_log_request(&mut self) -> (ErrorLogQuery, RequestTicket) {
        let query = self.error_log_query();
        let ticket = self.error_logs.issue();
        (query, ticket)
    }
}

fn stats_slot(state: &mut ConsoleState) -> &mut Versioned<Option<StatsSnapshot>> {
    &mut state.stats
}

fn error_logs_slot(state: &mut ConsoleState) -> &mut Versioned<Vec<ErrorLogEntry>> {
    &mut state.error_logs
}

fn failed_messages_slot(state: &mut ConsoleState) -> &mut Versioned<Vec<FailedMessage>> {
    &mut state.failed_messages
}

fn dlq_slot(state: &mut ConsoleState) -> &mut Versioned<Vec<DlqEntry>> {
    &mut state.dlq
}

/// Shared by the controller, its timer and any retry orchestrators
#[derive(Debug)]
pub(crate) struct ConsoleCore {
    pub(crate) api: Arc<dyn RegistrationApi>,
    scheduler: Arc<dyn Scheduler>,
    pub(crate) config: ConsoleConfig,
    alive: AtomicBool,
    pub(crate) state: Mutex<ConsoleState>,
}

/// Status changes between two reads that the retry state machine has no edge for
fn log_unexpected_transitions(previous: &[FailedMessage], current: &[FailedMessage]) {
    for message in current {
        let Some(before) = previous.iter().find(|m| m.id == message.id) else {
            continue;
        };
        if !before.status.can_transition_to(message.status) {
            debug!(
                message_id = message.id,
                from = %before.status,
                to = %message.status,
                "Failed message status changed outside the retry state machine"
            );
        }
    }
}

/// Keeps the shared loading counter honest even if a load is dropped mid-flight
struct LoadGuard<'a> {
    core: &'a ConsoleCore,
}

impl<'a> LoadGuard<'a> {
    fn new(core: &'a ConsoleCore) -> Self {
        core.state.lock().in_flight_loads += 1;
        Self { core }
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.core.state.lock();
        state.in_flight_loads = state.in_flight_loads.saturating_sub(1);
    }
}

impl ConsoleCore {
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn issue<T>(&self, slot: fn(&mut ConsoleState) -> &mut Versioned<T>) -> RequestTicket {
        slot(&mut self.state.lock()).issue()
    }

    /// Await a request issued under `ticket` and commit it if it is still the newest
    async fn load<T, Fut>(
        &self,
        dataset: Dataset,
        slot: fn(&mut ConsoleState) -> &mut Versioned<T>,
        ticket: RequestTicket,
        request: Fut,
    ) where
        Fut: Future<Output = ClientResult<T>>,
    {
        if !self.is_alive() {
            return;
        }

        let guard = LoadGuard::new(self);
        let outcome = request.await;
        drop(guard);

        if !self.is_alive() {
            debug!(dataset = %dataset, "Console unmounted; discarding response");
            return;
        }

        let mut state = self.state.lock();
        match outcome {
            Ok(value) => {
                if !slot(&mut state).commit(ticket, value) {
                    debug!(
                        dataset = %dataset,
                        seq = ticket.seq(),
                        "Dropping stale response"
                    );
                }
            }
            Err(e) => {
                warn!(
                    dataset = %dataset,
                    seq = ticket.seq(),
                    error = %e,
                    "Failed to refresh console data; keeping previous data"
                );
            }
        }
    }

    pub(crate) async fn refresh(&self, dataset: Dataset) {
        match dataset {
            Dataset::Stats => {
                let ticket = self.issue(stats_slot);
                self.load(
                    dataset,
                    stats_slot,
                    ticket,
                    self.api.get_stats().map(|r| r.map(Some)),
                )
                .await;
            }
            Dataset::ErrorLogs => {
                let (query, ticket) = self.state.lock().issue_error_log_request();
                if query.is_filtered() {
                    self.load(
                        dataset,
                        error_logs_slot,
                        ticket,
                        self.api.search_error_logs(&query),
                    )
                    .await;
                } else {
                    self.load(dataset, error_logs_slot, ticket, self.api.list_error_logs())
                        .await;
                }
            }
            Dataset::FailedMessages => {
                let (previous, ticket) = {
                    let mut state = self.state.lock();
                    let ticket = state.failed_messages.issue();
                    (state.failed_messages.value().clone(), ticket)
                };
                let request = self.api.list_failed_messages().inspect(move |result| {
                    if let Ok(current) = result {
                        log_unexpected_transitions(&previous, current);
                    }
                });
                self.load(dataset, failed_messages_slot, ticket, request).await;
            }
            Dataset::Dlq => {
                let ticket = self.issue(dlq_slot);
                self.load(dataset, dlq_slot, ticket, self.api.list_dlq_entries())
                    .await;
            }
        }
    }

    async fn refresh_active_tab(&self) {
        let tab = self.state.lock().active_tab;
        if let Some(dataset) = tab.dataset() {
            self.refresh(dataset).await;
        }
    }

    /// One background refresh cycle
    async fn tick(&self) {
        let tab = self.state.lock().active_tab;
        debug!(active_tab = %tab, "Console refresh tick");
        match tab.dataset() {
            Some(dataset) => {
                tokio::join!(self.refresh(Dataset::Stats), self.refresh(dataset));
            }
            None => self.refresh(Dataset::Stats).await,
        }
    }

    /// Re-read everything a retry command can change
    pub(crate) async fn refresh_after_command(&self) {
        tokio::join!(
            self.refresh(Dataset::FailedMessages),
            self.refresh(Dataset::Dlq),
            self.refresh(Dataset::Stats),
        );
    }

    pub(crate) fn dlq_size(&self) -> usize {
        self.state.lock().dlq.value().len()
    }

    fn shutdown(&self) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(mut timer) = self.state.lock().refresh_timer.take() {
            timer.cancel();
        }
        info!("Admin recovery console unmounted");
    }
}

/// Operator console over the recovery datasets
///
/// # Examples
///
/// ```rust,ignore
/// let console = AdminRecoveryController::mount(api, TokioScheduler::shared(), config.console).await;
/// console.select_tab(ConsoleTab::Dlq).await;
/// for entry in console.dlq_entries() {
///     println!("{} {}", entry.message.id, entry.message.student_id);
/// }
/// console.unmount();
/// ```
#[derive(Debug)]
pub struct AdminRecoveryController {
    core: Arc<ConsoleCore>,
}

impl AdminRecoveryController {
    /// Start the console: arm the background refresh and load stats
    pub async fn mount(
        api: Arc<dyn RegistrationApi>,
        scheduler: Arc<dyn Scheduler>,
        config: ConsoleConfig,
    ) -> Self {
        let period = config.refresh_interval();
        let core = Arc::new(ConsoleCore {
            api,
            scheduler,
            config,
            alive: AtomicBool::new(true),
            state: Mutex::new(ConsoleState::default()),
        });

        let weak = Arc::downgrade(&core);
        let task: RepeatingTask = Arc::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(core) = weak.upgrade() {
                    if core.is_alive() {
                        core.tick().await;
                    }
                }
            }
            .boxed()
        });
        let timer = core
            .scheduler
            .schedule_repeating("console-refresh", period, task);
        core.state.lock().refresh_timer = Some(timer);

        info!(
            endpoint = %core.api.endpoint(),
            refresh_interval_secs = period.as_secs(),
            "Admin recovery console mounted"
        );

        core.refresh(Dataset::Stats).await;
        Self { core }
    }

    // ===================================================================================
    // TABS AND FILTERS
    // ===================================================================================

    #[must_use]
    pub fn active_tab(&self) -> ConsoleTab {
        self.core.state.lock().active_tab
    }

    /// Switch tabs and load the new tab's dataset right away
    pub async fn select_tab(&self, tab: ConsoleTab) {
        {
            let mut state = self.core.state.lock();
            if state.active_tab == tab {
                return;
            }
            state.active_tab = tab;
        }
        debug!(tab = %tab, "Console tab selected");
        self.core.refresh_active_tab().await;
    }

    #[must_use]
    pub fn category_filter(&self) -> Option<ErrorCategory> {
        self.core.state.lock().category_filter
    }

    #[must_use]
    pub fn stage_filter(&self) -> Option<String> {
        self.core.state.lock().stage_filter.clone()
    }

    pub async fn set_category_filter(&self, category: Option<ErrorCategory>) {
        {
            let mut state = self.core.state.lock();
            if state.category_filter == category {
                return;
            }
            state.category_filter = category;
        }
        self.core.refresh_active_tab().await;
    }

    /// Blank stages clear the filter
    pub async fn set_stage_filter(&self, stage: Option<String>) {
        let stage = stage
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        {
            let mut state = self.core.state.lock();
            if state.stage_filter == stage {
                return;
            }
            state.stage_filter = stage;
        }
        self.core.refresh_active_tab().await;
    }

    pub async fn clear_filters(&self) {
        {
            let mut state = self.core.state.lock();
            if state.category_filter.is_none() && state.stage_filter.is_none() {
                return;
            }
            state.category_filter = None;
            state.stage_filter = None;
        }
        self.core.refresh_active_tab().await;
    }

    /// Run one refresh cycle now, as the background timer would
    pub async fn refresh_now(&self) {
        self.core.tick().await;
    }

    // ===================================================================================
    // DATASETS
    // ===================================================================================

    #[must_use]
    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.core.state.lock().stats.value().clone()
    }

    #[must_use]
    pub fn error_logs(&self) -> Vec<ErrorLogEntry> {
        self.core.state.lock().error_logs.value().clone()
    }

    #[must_use]
    pub fn failed_messages(&self) -> Vec<FailedMessage> {
        self.core.state.lock().failed_messages.value().clone()
    }

    #[must_use]
    pub fn dlq_entries(&self) -> Vec<DlqEntry> {
        self.core.state.lock().dlq.value().clone()
    }

    /// Single loading indicator shared by every dataset
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.core.state.lock().in_flight_loads > 0
    }

    #[must_use]
    pub fn snapshot(&self) -> ConsoleSnapshot {
        let state = self.core.state.lock();
        ConsoleSnapshot {
            active_tab: state.active_tab,
            category_filter: state.category_filter,
            stage_filter: state.stage_filter.clone(),
            stats: state.stats.value().clone(),
            error_logs: state.error_logs.value().clone(),
            failed_messages: state.failed_messages.value().clone(),
            dlq_entries: state.dlq.value().clone(),
            loading: state.in_flight_loads > 0,
        }
    }

    // ===================================================================================
    // LIFECYCLE
    // ===================================================================================

    /// Retry commands issued as `operator`, refreshing this console afterwards
    #[must_use]
    pub fn retry_orchestrator(&self, operator: OperatorIdentity) -> RetryOrchestrator {
        RetryOrchestrator::new(Arc::clone(&self.core), operator)
    }

    /// Retry commands issued as the configured operator
    #[must_use]
    pub fn default_retry_orchestrator(&self) -> RetryOrchestrator {
        self.retry_orchestrator(self.core.config.operator_identity())
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.core.is_alive()
    }

    /// Cancel the background refresh; later responses are discarded
    pub fn unmount(&self) {
        self.core.shutdown();
    }
}

impl Drop for AdminRecoveryController {
    fn drop(&mut self) {
        self.core.shutdown();
    }
}
