#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Registration Client
//!
//! Client-side orchestration for student registration and failed-delivery
//! recovery.
//!
//! ## Overview
//!
//! A registration is submitted once, routed by year level to the housing or
//! billing system (library always), translated through a chain of formats
//! and finally aggregated into a cross-system profile. This crate drives
//! that flow from the client side and hosts the operator console that
//! watches the failures it produces.
//!
//! ## Module Organization
//!
//! - [`registration`] - Submission lifecycle, deferred profile read, XML export
//! - [`admin`] - Recovery console datasets and retry commands
//! - [`transport`] - The HTTP collaborator both flows consume
//! - [`api_clients`] - reqwest implementation and error normalization
//! - [`timer`] - Cancellable deferred and repeating work
//! - [`models`] - Wire types and the category/status taxonomy
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Subscriber setup for binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use registration_client::{
//!     ClientConfig, RegistrationApi, RegistrationApiClient, RegistrationField,
//!     SubmissionCoordinator, TokioScheduler,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load()?;
//! let api: Arc<dyn RegistrationApi> = Arc::new(RegistrationApiClient::from_client_config(&config)?);
//!
//! let coordinator = SubmissionCoordinator::new(api, TokioScheduler::shared(), config.registration);
//! coordinator.set_field(RegistrationField::StudentName, "A B");
//! coordinator.set_field(RegistrationField::StudentId, "S1");
//! coordinator.set_field(RegistrationField::Email, "a@b.edu");
//! coordinator.set_field(RegistrationField::Program, "Engineering");
//! coordinator.set_field(RegistrationField::YearLevel, "First Year");
//!
//! let result = coordinator.submit().await?;
//! println!("Registration {:?} routed to {:?}", result.registration_id, result.routing);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod api_clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registration;
pub mod timer;
pub mod transport;

pub use admin::{
    AdminRecoveryController, ConfirmationPrompt, ConfirmedDlqRetry, ConsoleSnapshot, ConsoleTab,
    DlqRetryConfirmation, RetryDialog, RetryOrchestrator,
};
pub use api_clients::RegistrationApiClient;
pub use config::{
    ApiEndpointConfig, ClientConfig, ConsoleConfig, LoggingConfig, RegistrationConfig,
};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use models::{
    AggregatedProfile, ErrorCategory, OperatorIdentity, RegistrationField, RegistrationInput,
    RetryStatus, YearLevel,
};
pub use registration::{
    AggregatedProfileFetcher, ArtifactSink, ExportArtifact, FileArtifactSink, ProfileState,
    SubmissionCoordinator, SubmissionPhase, SubmissionResult,
};
pub use timer::{Scheduler, TimerHandle, TokioScheduler};
pub use transport::RegistrationApi;
