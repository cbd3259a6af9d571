//! # Aggregated Profile Fetcher
//!
//! Performs the single deferred read of a student's aggregated profile
//! after a successful submission. Failures are deliberately silent: they
//! are logged and the state drops back to [`ProfileState::Pending`], because
//! the aggregation may still be arriving on the server side.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::AggregatedProfile;
use crate::transport::RegistrationApi;

/// Observable state of the profile read
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProfileState {
    /// Not fetched yet, or the fetch failed
    #[default]
    Pending,
    /// Request outstanding
    Loading,
    Complete(AggregatedProfile),
}

impl ProfileState {
    #[must_use]
    pub fn profile(&self) -> Option<&AggregatedProfile> {
        match self {
            ProfileState::Complete(profile) => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, ProfileState::Loading)
    }
}

#[derive(Debug, Default)]
struct FetcherState {
    state: ProfileState,
    generation: u64,
}

/// One-shot reader of the cross-system profile
#[derive(Debug)]
pub struct AggregatedProfileFetcher {
    api: Arc<dyn RegistrationApi>,
    inner: Mutex<FetcherState>,
}

impl AggregatedProfileFetcher {
    pub fn new(api: Arc<dyn RegistrationApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(FetcherState::default()),
        }
    }

    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.inner.lock().state.clone()
    }

    /// Drop any held profile and orphan an in-flight read
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ProfileState::Pending;
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Read the profile once. Never fails from the caller's point of view.
    pub async fn fetch_once(&self, student_id: &str) {
        let generation = self.generation();
        self.fetch_for_generation(generation, student_id).await;
    }

    /// Read the profile only if no reset happened since `generation` was observed
    pub(crate) async fn fetch_for_generation(&self, generation: u64, student_id: &str) {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                debug!(student_id = %student_id, "Skipping profile fetch for a dismissed submission");
                return;
            }
            inner.state = ProfileState::Loading;
        }

        debug!(student_id = %student_id, "Fetching aggregated profile");
        let result = self.api.get_aggregated_profile(student_id).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                student_id = %student_id,
                "Discarding aggregated profile for a dismissed submission"
            );
            return;
        }

        match result {
            Ok(profile) => {
                info!(
                    student_id = %student_id,
                    status = %profile.aggregation_status,
                    received = profile.responses_received,
                    expected = profile.responses_expected,
                    "Aggregated profile received"
                );
                inner.state = ProfileState::Complete(profile);
            }
            Err(e) => {
                warn!(
                    student_id = %student_id,
                    error = %e,
                    "Aggregated profile fetch failed; leaving profile pending"
                );
                inner.state = ProfileState::Pending;
            }
        }
    }
}
