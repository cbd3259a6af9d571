//! # Retry Orchestrator
//!
//! Operator-initiated recovery commands. Neither command mutates local
//! data: after the server answers, the failed-message list, the DLQ and the
//! stats are re-read, and until those reads land the console keeps showing
//! the pre-command state.
//!
//! Bulk DLQ retry is destructive, so it takes two steps. The command
//! requires a [`ConfirmedDlqRetry`], and the only way to get one is to
//! confirm the [`DlqRetryConfirmation`] returned by
//! [`RetryOrchestrator::request_retry_all_dlq`].

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use super::controller::ConsoleCore;
use crate::error::{ClientError, ClientResult};
use crate::models::{BulkRetryReport, ManualRetryReceipt, OperatorIdentity};

/// State of the single-message retry input surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryDialog {
    pub open: bool,
    pub message_id: Option<i64>,
    pub notes: String,
}

/// Pending request to retry the whole DLQ, awaiting the operator's answer
#[must_use = "a bulk retry is only issued after the confirmation is confirmed"]
#[derive(Debug)]
pub struct DlqRetryConfirmation {
    prompt: String,
    dlq_size: usize,
}

impl DlqRetryConfirmation {
    /// Question to put to the operator
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Entries in the DLQ as last loaded by the console
    pub fn dlq_size(&self) -> usize {
        self.dlq_size
    }

    pub fn confirm(self) -> ConfirmedDlqRetry {
        ConfirmedDlqRetry { _private: () }
    }

    pub fn decline(self) {
        info!("Bulk DLQ retry declined by operator");
    }
}

/// Proof that the operator confirmed a bulk DLQ retry
#[derive(Debug)]
pub struct ConfirmedDlqRetry {
    _private: (),
}

/// Host capability that asks the operator a yes/no question
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Issues retry commands and refreshes the console they belong to
pub struct RetryOrchestrator {
    core: Arc<ConsoleCore>,
    operator: OperatorIdentity,
    dialog: Mutex<RetryDialog>,
}

impl fmt::Debug for RetryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOrchestrator")
            .field("operator", &self.operator)
            .field("dialog", &*self.dialog.lock())
            .finish()
    }
}

impl RetryOrchestrator {
    pub(crate) fn new(core: Arc<ConsoleCore>, operator: OperatorIdentity) -> Self {
        Self {
            core,
            operator,
            dialog: Mutex::new(RetryDialog::default()),
        }
    }

    #[must_use]
    pub fn operator(&self) -> &OperatorIdentity {
        &self.operator
    }

    fn ensure_mounted(&self) -> ClientResult<()> {
        if self.core.is_alive() {
            Ok(())
        } else {
            Err(ClientError::NotReady(
                "recovery console is not mounted".to_string(),
            ))
        }
    }

    // ===================================================================================
    // RETRY DIALOG
    // ===================================================================================

    #[must_use]
    pub fn dialog(&self) -> RetryDialog {
        self.dialog.lock().clone()
    }

    pub fn open_retry_dialog(&self, message_id: i64) {
        *self.dialog.lock() = RetryDialog {
            open: true,
            message_id: Some(message_id),
            notes: String::new(),
        };
    }

    pub fn set_notes(&self, notes: impl Into<String>) {
        self.dialog.lock().notes = notes.into();
    }

    pub fn close_retry_dialog(&self) {
        *self.dialog.lock() = RetryDialog::default();
    }

    /// Retry the message the dialog was opened for, with its notes
    pub async fn submit_retry_dialog(&self) -> ClientResult<ManualRetryReceipt> {
        let (message_id, notes) = {
            let dialog = self.dialog.lock();
            match (dialog.open, dialog.message_id) {
                (true, Some(id)) => (id, dialog.notes.clone()),
                _ => {
                    return Err(ClientError::NotReady(
                        "no message selected for retry".to_string(),
                    ))
                }
            }
        };
        self.manual_retry(message_id, &notes).await
    }

    // ===================================================================================
    // COMMANDS
    // ===================================================================================

    /// Retry one failed message
    ///
    /// The dialog closes and its notes clear whatever the outcome. On
    /// success the three dependent datasets are re-read before returning;
    /// on failure the server's message is returned verbatim.
    pub async fn manual_retry(&self, message_id: i64, notes: &str) -> ClientResult<ManualRetryReceipt> {
        if let Err(e) = self.ensure_mounted() {
            self.close_retry_dialog();
            return Err(e);
        }

        info!(
            message_id = message_id,
            operator = %self.operator,
            "Issuing manual retry"
        );
        let outcome = self
            .core
            .api
            .manual_retry(message_id, &self.operator, notes)
            .await;
        self.close_retry_dialog();

        match outcome {
            Ok(receipt) => {
                info!(
                    message_id = message_id,
                    message = %receipt.message,
                    "Manual retry succeeded"
                );
                self.core.refresh_after_command().await;
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    message_id = message_id,
                    kind = ?e.kind(),
                    error = %e,
                    "Manual retry failed"
                );
                Err(e)
            }
        }
    }

    /// First step of a bulk retry: describe what is about to happen
    pub fn request_retry_all_dlq(&self) -> DlqRetryConfirmation {
        let dlq_size = self.core.dlq_size();
        DlqRetryConfirmation {
            prompt: format!(
                "Are you sure you want to retry ALL messages in the DLQ ({} currently loaded)?",
                dlq_size
            ),
            dlq_size,
        }
    }

    /// Second step of a bulk retry
    pub async fn retry_all_dlq(&self, _confirmed: ConfirmedDlqRetry) -> ClientResult<BulkRetryReport> {
        self.ensure_mounted()?;

        let notes = self.core.config.bulk_retry_notes.clone();
        info!(operator = %self.operator, "Retrying all DLQ messages");
        let report = self
            .core
            .api
            .retry_all_dlq(&self.operator, &notes)
            .await
            .map_err(|e| {
                warn!(error = %e, "Bulk DLQ retry failed");
                e
            })?;

        info!(
            total = report.total_messages,
            succeeded = report.success_count,
            failed = report.failure_count,
            "Bulk DLQ retry completed"
        );
        self.core.refresh_after_command().await;
        Ok(report)
    }

    /// Run both steps against a host prompt; `Ok(None)` when declined
    pub async fn retry_all_dlq_with(
        &self,
        prompt: &dyn ConfirmationPrompt,
    ) -> ClientResult<Option<BulkRetryReport>> {
        let confirmation = self.request_retry_all_dlq();
        if prompt.confirm(confirmation.prompt()) {
            self.retry_all_dlq(confirmation.confirm()).await.map(Some)
        } else {
            confirmation.decline();
            Ok(None)
        }
    }
}
