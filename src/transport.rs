//! # Registration API Abstraction
//!
//! The HTTP collaborator both orchestration flows consume, expressed as a
//! trait so controllers can be driven by the REST client in production and
//! by recording doubles in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use registration_client::{ClientConfig, RegistrationApi, RegistrationApiClient};
//!
//! let config = ClientConfig::load()?;
//! let api: Arc<dyn RegistrationApi> = Arc::new(RegistrationApiClient::from_client_config(&config)?);
//! let stats = api.get_stats().await?;
//! ```

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    AdminHealth, AggregatedProfile, BulkRetryReport, DlqEntry, ErrorLogEntry, ErrorLogQuery,
    FailedMessage, ManualRetryReceipt, OperatorIdentity, RegistrationReceipt,
    RegistrationRequest, RegistrationStatus, RetryStatus, RetrySuccessRate, StatsSnapshot,
};
use crate::registration::ExportArtifact;

/// Operations the registration and admin services expose.
///
/// Implementations normalize every failure into a `ClientError` whose
/// [`kind`](crate::ClientError::kind) is Validation, Business or Transport.
/// Responses that decode but report `success: false` are Business errors.
#[async_trait]
pub trait RegistrationApi: Send + Sync + std::fmt::Debug {
    /// Get the transport name for debugging/logging.
    fn transport_name(&self) -> &'static str;

    /// Get the endpoint URL.
    fn endpoint(&self) -> &str;

    // ===================================================================================
    // REGISTRATION OPERATIONS
    // ===================================================================================

    /// Submit a registration for routing and translation.
    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> ClientResult<RegistrationReceipt>;

    /// Single read of the aggregated cross-system profile.
    async fn get_aggregated_profile(&self, student_id: &str) -> ClientResult<AggregatedProfile>;

    /// Registration rendered as XML, ready to be saved.
    async fn download_registration_xml(&self, student_id: &str) -> ClientResult<ExportArtifact>;

    /// Combined registration and retry status for a student.
    async fn get_registration_status(&self, student_id: &str)
        -> ClientResult<RegistrationStatus>;

    // ===================================================================================
    // ADMIN READS
    // ===================================================================================

    async fn get_stats(&self) -> ClientResult<StatsSnapshot>;

    /// Unfiltered error log listing.
    async fn list_error_logs(&self) -> ClientResult<Vec<ErrorLogEntry>>;

    /// Filtered error log search; only the query's non-empty criteria are sent.
    async fn search_error_logs(&self, query: &ErrorLogQuery) -> ClientResult<Vec<ErrorLogEntry>>;

    async fn list_failed_messages(&self) -> ClientResult<Vec<FailedMessage>>;

    async fn list_failed_messages_by_status(
        &self,
        status: RetryStatus,
    ) -> ClientResult<Vec<FailedMessage>>;

    async fn list_dlq_entries(&self) -> ClientResult<Vec<DlqEntry>>;

    async fn get_retry_success_rate(&self) -> ClientResult<RetrySuccessRate>;

    async fn get_admin_health(&self) -> ClientResult<AdminHealth>;

    // ===================================================================================
    // RECOVERY COMMANDS
    // ===================================================================================

    /// Retry one failed message on the operator's behalf.
    async fn manual_retry(
        &self,
        message_id: i64,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<ManualRetryReceipt>;

    /// Retry every message in the dead-letter queue.
    async fn retry_all_dlq(
        &self,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<BulkRetryReport>;
}
