//! Data model shared by the registration flow and the recovery console.

pub mod admin;
pub mod profile;
pub mod registration;
pub mod taxonomy;

pub use admin::{
    AdminHealth, BulkRetryReport, DlqEntry, ErrorLogEntry, ErrorLogQuery, FailedMessage,
    ManualRetryReceipt, OperatorIdentity, RetryHistoryEntry, RetrySuccessRate, StatsSnapshot,
};
pub use profile::{AggregatedProfile, ProfileFragment};
pub use registration::{
    RegistrationField, RegistrationInput, RegistrationReceipt, RegistrationRequest,
    RegistrationStatus, RoutingDecision, TranslationChain, TranslationStep, YearLevel,
    BILLING_SYSTEM, HOUSING_SYSTEM, LIBRARY_SYSTEM,
};
pub use taxonomy::{AggregationStatus, ErrorCategory, RetryStatus};
