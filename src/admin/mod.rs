//! # Recovery Console
//!
//! Operational datasets for failed registrations and the commands that
//! recover them.

pub mod controller;
pub mod retry;
pub mod sequence;

pub use controller::{AdminRecoveryController, ConsoleSnapshot, ConsoleTab, Dataset};
pub use retry::{
    ConfirmationPrompt, ConfirmedDlqRetry, DlqRetryConfirmation, RetryDialog, RetryOrchestrator,
};
pub use sequence::{RequestTicket, Versioned};
