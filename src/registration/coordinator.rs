//! # Submission Coordinator
//!
//! Drives one registration through submit → routing/translation display →
//! deferred profile read, and back to idle on dismissal.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Succeeded ──dismiss──▶ Idle
//!                      │
//!                      └────err──▶ Failed ──dismiss──▶ Idle
//! ```
//!
//! A successful submit arms exactly one deferred read of the aggregated
//! profile. Dismissal and teardown cancel it; a read that is already in
//! flight is orphaned through the fetcher's generation counter.

use futures::FutureExt;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use super::export::ArtifactSink;
use super::profile_fetcher::{AggregatedProfileFetcher, ProfileState};
use crate::config::RegistrationConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    RegistrationField, RegistrationInput, RegistrationReceipt, RegistrationRequest,
    RoutingDecision, TranslationChain,
};
use crate::timer::{Scheduler, TimerHandle};
use crate::transport::RegistrationApi;

/// Where the coordinator is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// What the result surface shows after a successful submit
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub registration_id: Option<i64>,
    pub message: String,
    pub status: Option<String>,
    pub student_id: String,
    pub student_name: String,
    pub routing: Option<RoutingDecision>,
    pub translation: Option<TranslationChain>,
}

impl SubmissionResult {
    fn from_receipt(request: &RegistrationRequest, receipt: RegistrationReceipt) -> Self {
        Self {
            registration_id: receipt.registration_id,
            status: receipt.status.clone(),
            routing: receipt.routing_decision(),
            message: receipt.message,
            translation: receipt.translation_chain,
            student_id: request.student_id.clone(),
            student_name: request.student_name.clone(),
        }
    }
}

/// Point-in-time view of the coordinator for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionSnapshot {
    pub phase: SubmissionPhase,
    pub input: RegistrationInput,
    pub result: Option<SubmissionResult>,
    pub error_message: Option<String>,
    pub profile: ProfileState,
}

#[derive(Debug, Default)]
struct SubmissionState {
    phase: SubmissionPhase,
    input: RegistrationInput,
    result: Option<SubmissionResult>,
    error_message: Option<String>,
    profile_timer: Option<TimerHandle>,
}

impl SubmissionState {
    fn clear_result(&mut self) {
        if let Some(mut timer) = self.profile_timer.take() {
            timer.cancel();
        }
        self.result = None;
        self.error_message = None;
    }
}

#[derive(Debug)]
struct SubmissionCore {
    api: Arc<dyn RegistrationApi>,
    scheduler: Arc<dyn Scheduler>,
    fetcher: Arc<AggregatedProfileFetcher>,
    config: RegistrationConfig,
    alive: AtomicBool,
    state: Mutex<SubmissionState>,
}

impl SubmissionCore {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Registration submit lifecycle with single-flight submission
///
/// # Examples
///
/// ```rust,ignore
/// let coordinator = SubmissionCoordinator::new(api, TokioScheduler::shared(), config.registration);
/// coordinator.set_field(RegistrationField::StudentName, "A B");
/// // ...
/// let result = coordinator.submit().await?;
/// println!("routed to {:?}", result.routing);
/// ```
#[derive(Debug)]
pub struct SubmissionCoordinator {
    core: Arc<SubmissionCore>,
}

impl SubmissionCoordinator {
    pub fn new(
        api: Arc<dyn RegistrationApi>,
        scheduler: Arc<dyn Scheduler>,
        config: RegistrationConfig,
    ) -> Self {
        let fetcher = Arc::new(AggregatedProfileFetcher::new(Arc::clone(&api)));
        Self {
            core: Arc::new(SubmissionCore {
                api,
                scheduler,
                fetcher,
                config,
                alive: AtomicBool::new(true),
                state: Mutex::new(SubmissionState::default()),
            }),
        }
    }

    // ===================================================================================
    // FORM STATE
    // ===================================================================================

    pub fn set_field(&self, field: RegistrationField, value: impl Into<String>) {
        self.core.state.lock().input.set_field(field, value);
    }

    pub fn set_input(&self, input: RegistrationInput) {
        self.core.state.lock().input = input;
    }

    #[must_use]
    pub fn input(&self) -> RegistrationInput {
        self.core.state.lock().input.clone()
    }

    // ===================================================================================
    // OBSERVATION
    // ===================================================================================

    #[must_use]
    pub fn phase(&self) -> SubmissionPhase {
        self.core.state.lock().phase
    }

    #[must_use]
    pub fn result(&self) -> Option<SubmissionResult> {
        self.core.state.lock().result.clone()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.core.state.lock().error_message.clone()
    }

    #[must_use]
    pub fn profile_state(&self) -> ProfileState {
        self.core.fetcher.state()
    }

    /// Whether the deferred profile read is still waiting to fire
    #[must_use]
    pub fn profile_fetch_armed(&self) -> bool {
        self.core
            .state
            .lock()
            .profile_timer
            .as_ref()
            .is_some_and(TimerHandle::is_active)
    }

    #[must_use]
    pub fn snapshot(&self) -> SubmissionSnapshot {
        let state = self.core.state.lock();
        SubmissionSnapshot {
            phase: state.phase,
            input: state.input.clone(),
            result: state.result.clone(),
            error_message: state.error_message.clone(),
            profile: self.core.fetcher.state(),
        }
    }

    // ===================================================================================
    // COMMANDS
    // ===================================================================================

    /// Submit the current form input
    ///
    /// Refused with [`ClientError::SubmissionInFlight`] while another submit is
    /// outstanding, and with [`ClientError::InvalidInput`] when a required field
    /// is empty; neither issues a request.
    pub async fn submit(&self) -> ClientResult<SubmissionResult> {
        let core = &self.core;
        if !core.is_alive() {
            return Err(ClientError::NotReady(
                "registration form has been closed".to_string(),
            ));
        }

        let request = {
            let mut state = core.state.lock();
            if state.phase == SubmissionPhase::Submitting {
                debug!("Rejecting submit while another submission is outstanding");
                return Err(ClientError::SubmissionInFlight);
            }
            let request = state.input.validate()?;
            if state.phase == SubmissionPhase::Succeeded {
                state.clear_result();
                core.fetcher.reset();
            }
            state.error_message = None;
            state.phase = SubmissionPhase::Submitting;
            request
        };

        info!(
            student_id = %request.student_id,
            year_level = %request.year_level.label(),
            "Submitting registration"
        );
        let outcome = core.api.submit_registration(&request).await;

        let mut state = core.state.lock();
        if !core.is_alive() {
            debug!(
                student_id = %request.student_id,
                "Registration form closed before the submit completed; discarding response"
            );
            return outcome.map(|receipt| SubmissionResult::from_receipt(&request, receipt));
        }

        match outcome {
            Ok(receipt) => {
                let result = SubmissionResult::from_receipt(&request, receipt);
                if let Some(routing) = &result.routing {
                    if !routing.is_consistent() {
                        warn!(
                            student_id = %result.student_id,
                            is_first_year = routing.is_first_year,
                            routed_to = ?routing.routed_to,
                            "Routing decision does not match the year-level routing rules"
                        );
                    }
                }

                state.input.clear();
                state.result = Some(result.clone());
                state.phase = SubmissionPhase::Succeeded;
                state.profile_timer = Some(Self::arm_profile_fetch(core, &result.student_id));

                info!(
                    student_id = %result.student_id,
                    registration_id = ?result.registration_id,
                    "Registration submitted"
                );
                Ok(result)
            }
            Err(e) => {
                let message = e.user_message("submit registration");
                warn!(
                    student_id = %request.student_id,
                    kind = ?e.kind(),
                    error = %message,
                    "Registration submit failed"
                );
                state.phase = SubmissionPhase::Failed;
                state.error_message = Some(message);
                Err(e)
            }
        }
    }

    fn arm_profile_fetch(core: &Arc<SubmissionCore>, student_id: &str) -> TimerHandle {
        let weak: Weak<SubmissionCore> = Arc::downgrade(core);
        let generation = core.fetcher.generation();
        let student_id = student_id.to_string();

        core.scheduler.schedule_once(
            "profile-fetch",
            core.config.profile_fetch_delay(),
            async move {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                if !core.is_alive() {
                    return;
                }
                let fetcher = Arc::clone(&core.fetcher);
                drop(core);
                fetcher.fetch_for_generation(generation, &student_id).await;
            }
            .boxed(),
        )
    }

    /// Close the result surface and discard everything the last submit produced
    pub fn dismiss(&self) {
        let mut state = self.core.state.lock();
        if state.phase == SubmissionPhase::Submitting {
            debug!("Ignoring dismiss while a submission is outstanding");
            return;
        }
        state.clear_result();
        state.phase = SubmissionPhase::Idle;
        self.core.fetcher.reset();
        debug!("Registration result dismissed");
    }

    /// Fetch the XML export for the last successful submit and save it
    ///
    /// Failures are returned to the caller; coordinator state is untouched.
    pub async fn export_artifact(&self, sink: &dyn ArtifactSink) -> ClientResult<PathBuf> {
        let student_id = self
            .core
            .state
            .lock()
            .result
            .as_ref()
            .map(|r| r.student_id.clone())
            .ok_or_else(|| {
                ClientError::NotReady("no successful registration to export".to_string())
            })?;

        let artifact = self
            .core
            .api
            .download_registration_xml(&student_id)
            .await
            .map_err(|e| {
                warn!(student_id = %student_id, error = %e, "Registration export failed");
                e
            })?;
        sink.save(&artifact)
    }

    /// Release timers and stop accepting completions
    pub fn teardown(&self) {
        if !self.core.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(mut timer) = self.core.state.lock().profile_timer.take() {
            timer.cancel();
        }
        self.core.fetcher.reset();
        debug!("Submission coordinator torn down");
    }
}

impl Drop for SubmissionCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}
