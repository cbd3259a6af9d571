//! Recovery console and retry command behavior against a recording mock API.

mod common;

use std::sync::Mutex;
use std::time::Duration;

use common::*;
use registration_client::{
    AdminRecoveryController, ClientError, ConfirmationPrompt, ConsoleConfig, ConsoleTab,
    ErrorCategory, OperatorIdentity, RetryDialog, TokioScheduler,
};

async fn mount(mock: &MockRegistrationApi) -> AdminRecoveryController {
    AdminRecoveryController::mount(
        mock.as_api(),
        TokioScheduler::shared(),
        ConsoleConfig::default(),
    )
    .await
}

fn scripted_console_mock() -> MockRegistrationApi {
    let mock = MockRegistrationApi::new();
    mock.script(|s| {
        s.stats.always(Reply::ok(stats(2)));
        s.error_logs
            .always(Reply::ok(vec![error_log_entry(1, "NETWORK_TIMEOUT")]));
        s.failed_messages
            .always(Reply::ok(vec![failed_message(7), failed_message(8)]));
        s.dlq.always(Reply::ok(vec![dlq_entry(41), dlq_entry(42)]));
    });
    mock
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        self.asked.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

// =======================================================================================
// Mount and background refresh
// =======================================================================================

#[tokio::test(start_paused = true)]
async fn test_mount_loads_stats_once() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    assert_eq!(mock.calls(), vec![ApiCall::GetStats]);
    assert_eq!(console.active_tab(), ConsoleTab::Overview);
    assert_eq!(console.stats(), Some(stats(2)));
    assert!(console.is_mounted());
    assert!(!console.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_overview_tick_refreshes_stats_only() {
    let mock = scripted_console_mock();
    let _console = mount(&mock).await;

    advance(9_900).await;
    assert_eq!(mock.call_count(), 1);

    advance(200).await;
    assert_eq!(mock.calls(), vec![ApiCall::GetStats, ApiCall::GetStats]);

    advance(10_000).await;
    assert_eq!(mock.count_of(&ApiCall::GetStats), 3);
}

#[tokio::test(start_paused = true)]
async fn test_zero_refresh_interval_still_refreshes() {
    let mock = scripted_console_mock();
    let config = ConsoleConfig {
        refresh_interval_secs: 0,
        ..ConsoleConfig::default()
    };
    let _console =
        AdminRecoveryController::mount(mock.as_api(), TokioScheduler::shared(), config).await;
    assert_eq!(mock.count_of(&ApiCall::GetStats), 1);

    advance(1_050).await;

    assert_eq!(mock.count_of(&ApiCall::GetStats), 2);
}

#[tokio::test(start_paused = true)]
async fn test_tick_refreshes_stats_and_active_tab() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    console.select_tab(ConsoleTab::FailedMessages).await;
    let before = mock.call_count();

    advance(10_100).await;

    let tick_calls = mock.calls_since(before);
    assert_eq!(tick_calls.len(), 2);
    assert!(tick_calls.contains(&ApiCall::GetStats));
    assert!(tick_calls.contains(&ApiCall::ListFailedMessages));
}

#[tokio::test(start_paused = true)]
async fn test_tab_switch_fetches_that_tab_once() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    console.select_tab(ConsoleTab::Dlq).await;
    assert_eq!(mock.calls_since(1), vec![ApiCall::ListDlqEntries]);
    assert_eq!(console.dlq_entries().len(), 2);

    // Re-selecting the active tab is a no-op
    console.select_tab(ConsoleTab::Dlq).await;
    assert_eq!(mock.call_count(), 2);

    console.select_tab(ConsoleTab::Overview).await;
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_category_filter_searches_by_category_only() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    console.select_tab(ConsoleTab::ErrorLogs).await;
    console
        .set_category_filter(Some(ErrorCategory::NetworkTimeout))
        .await;

    assert_eq!(
        mock.calls_since(1),
        vec![
            ApiCall::ListErrorLogs,
            ApiCall::SearchErrorLogs(vec![("category", "NETWORK_TIMEOUT".to_string())]),
        ]
    );

    console.set_stage_filter(Some("  ROUTING ".to_string())).await;
    assert_eq!(
        mock.calls().last(),
        Some(&ApiCall::SearchErrorLogs(vec![
            ("category", "NETWORK_TIMEOUT".to_string()),
            ("stage", "ROUTING".to_string()),
        ]))
    );

    console.clear_filters().await;
    assert_eq!(mock.calls().last(), Some(&ApiCall::ListErrorLogs));
    assert_eq!(console.category_filter(), None);
    assert_eq!(console.stage_filter(), None);
}

#[tokio::test(start_paused = true)]
async fn test_category_filter_set_before_switching_tabs() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    // Filters only matter to the error log tab
    console
        .set_category_filter(Some(ErrorCategory::DatabaseError))
        .await;
    assert_eq!(mock.call_count(), 1);

    console.select_tab(ConsoleTab::ErrorLogs).await;
    assert_eq!(
        mock.calls_since(1),
        vec![ApiCall::SearchErrorLogs(vec![(
            "category",
            "DATABASE_ERROR".to_string()
        )])]
    );
}

#[tokio::test(start_paused = true)]
async fn test_blank_stage_filter_means_no_filter() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    console.select_tab(ConsoleTab::ErrorLogs).await;
    let before = mock.call_count();

    console.set_stage_filter(Some("   ".to_string())).await;

    assert_eq!(console.stage_filter(), None);
    assert_eq!(mock.call_count(), before);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_dropped() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.error_logs.then(
            Reply::ok(vec![error_log_entry(1, "SYSTEM_DOWN")]).after(Duration::from_secs(2)),
        );
        s.error_logs
            .then(Reply::ok(vec![error_log_entry(2, "INVALID_DATA")]));
    });
    let console = mount(&mock).await;

    tokio::join!(console.select_tab(ConsoleTab::ErrorLogs), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        console.refresh_now().await;
    });

    let logs = console.error_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, 2);
    assert_eq!(logs[0].error_category, ErrorCategory::InvalidData);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_failure_keeps_previous_data() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    console.select_tab(ConsoleTab::Dlq).await;
    assert_eq!(console.dlq_entries().len(), 2);

    mock.script(|s| {
        s.dlq
            .always(Reply::err(Failure::Transport("HTTP 503".to_string())));
        s.stats
            .always(Reply::err(Failure::Transport("HTTP 503".to_string())));
    });
    console.refresh_now().await;

    assert_eq!(console.dlq_entries().len(), 2);
    assert_eq!(console.stats(), Some(stats(2)));
    assert!(!console.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_covers_slow_fetch() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.failed_messages.then(
            Reply::ok(vec![failed_message(7)]).after(Duration::from_secs(1)),
        )
    });
    let console = mount(&mock).await;
    assert!(!console.is_loading());

    let ((), observed) = tokio::join!(console.select_tab(ConsoleTab::FailedMessages), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        console.snapshot().loading
    });

    assert!(observed);
    assert!(!console.is_loading());
    assert_eq!(console.failed_messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_background_refresh() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    console.unmount();
    advance(35_000).await;

    assert!(!console.is_mounted());
    assert_eq!(mock.calls(), vec![ApiCall::GetStats]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_console_stops_background_refresh() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;

    drop(console);
    advance(35_000).await;

    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_response_after_unmount_is_discarded() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.dlq
            .then(Reply::ok(vec![dlq_entry(41)]).after(Duration::from_secs(1)))
    });
    let console = mount(&mock).await;

    tokio::join!(console.select_tab(ConsoleTab::Dlq), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        console.unmount();
    });

    assert!(console.dlq_entries().is_empty());
}

// =======================================================================================
// Manual retry
// =======================================================================================

#[tokio::test(start_paused = true)]
async fn test_manual_retry_success_refreshes_dependent_datasets() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.manual_retry.always(Reply::ok(
            serde_json::from_value(serde_json::json!({
                "success": true,
                "message": "Message queued for retry",
                "messageId": 7,
                "retriedBy": "admin@rsu.edu"
            }))
            .unwrap(),
        ))
    });
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();
    assert_eq!(retry.operator(), &OperatorIdentity::new("admin@rsu.edu"));

    retry.open_retry_dialog(7);
    retry.set_notes("Housing back online");
    assert!(retry.dialog().open);

    let receipt = retry.submit_retry_dialog().await.unwrap();

    assert_eq!(receipt.message, "Message queued for retry");
    assert_eq!(
        mock.calls_since(1),
        vec![
            ApiCall::ManualRetry {
                message_id: 7,
                operator: "admin@rsu.edu".to_string(),
                notes: "Housing back online".to_string(),
            },
            ApiCall::ListFailedMessages,
            ApiCall::ListDlqEntries,
            ApiCall::GetStats,
        ]
    );
    let dialog = retry.dialog();
    assert!(!dialog.open);
    assert!(dialog.notes.is_empty());
    assert_eq!(console.failed_messages().len(), 2);
    assert_eq!(console.dlq_entries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_manual_retry_failure_returns_server_message() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.manual_retry.always(Reply::err(Failure::Business(
            "Message 7 is not awaiting manual retry".to_string(),
        )))
    });
    let console = mount(&mock).await;
    let retry = console.retry_orchestrator(OperatorIdentity::new("ops@rsu.edu"));

    retry.open_retry_dialog(7);
    retry.set_notes("second attempt");
    let err = retry.submit_retry_dialog().await.unwrap_err();

    assert_eq!(err.to_string(), "Message 7 is not awaiting manual retry");
    assert_eq!(
        err.user_message("retry message"),
        "Message 7 is not awaiting manual retry"
    );
    assert_eq!(retry.dialog(), RetryDialog::default());
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submit_without_open_dialog_is_refused() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();

    let err = retry.submit_retry_dialog().await.unwrap_err();

    assert!(matches!(err, ClientError::NotReady(_)));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_commands_after_unmount_are_refused() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();
    console.unmount();

    let err = retry.manual_retry(7, "").await.unwrap_err();

    assert!(matches!(err, ClientError::NotReady(_)));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refused_retry_still_closes_dialog() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();
    retry.open_retry_dialog(7);
    retry.set_notes("ops note");
    console.unmount();

    let err = retry.submit_retry_dialog().await.unwrap_err();

    assert!(matches!(err, ClientError::NotReady(_)));
    assert_eq!(retry.dialog(), RetryDialog::default());
    assert_eq!(
        mock.count(|c| matches!(c, ApiCall::ManualRetry { .. })),
        0
    );
}

// =======================================================================================
// Bulk DLQ retry
// =======================================================================================

#[tokio::test(start_paused = true)]
async fn test_declined_bulk_retry_issues_nothing() {
    let mock = scripted_console_mock();
    let console = mount(&mock).await;
    console.select_tab(ConsoleTab::Dlq).await;
    let retry = console.default_retry_orchestrator();
    let prompt = ScriptedPrompt::new(false);

    let outcome = retry.retry_all_dlq_with(&prompt).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(
        mock.count(|c| matches!(c, ApiCall::RetryAllDlq { .. })),
        0
    );
    assert_eq!(mock.call_count(), 2);
    assert_eq!(
        *prompt.asked.lock().unwrap(),
        vec!["Are you sure you want to retry ALL messages in the DLQ (2 currently loaded)?"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_bulk_retry_reports_and_refreshes() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.retry_all_dlq.always(Reply::ok(
            serde_json::from_value(serde_json::json!({
                "totalMessages": 2,
                "successCount": 1,
                "failureCount": 1
            }))
            .unwrap(),
        ))
    });
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();
    let prompt = ScriptedPrompt::new(true);

    let report = retry.retry_all_dlq_with(&prompt).await.unwrap().unwrap();

    assert_eq!(report.total_messages, 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.failure_count, 1);
    assert_eq!(
        mock.calls_since(1),
        vec![
            ApiCall::RetryAllDlq {
                operator: "admin@rsu.edu".to_string(),
                notes: "Bulk retry from admin dashboard".to_string(),
            },
            ApiCall::ListFailedMessages,
            ApiCall::ListDlqEntries,
            ApiCall::GetStats,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_bulk_retry_failure_skips_refresh() {
    let mock = scripted_console_mock();
    mock.script(|s| {
        s.retry_all_dlq
            .always(Reply::err(Failure::Transport("connection reset".to_string())))
    });
    let console = mount(&mock).await;
    let retry = console.default_retry_orchestrator();

    let confirmation = retry.request_retry_all_dlq();
    assert_eq!(confirmation.dlq_size(), 0);
    let err = retry.retry_all_dlq(confirmation.confirm()).await.unwrap_err();

    assert_eq!(
        err.user_message("retry DLQ messages"),
        "Failed to retry DLQ messages: connection reset"
    );
    assert_eq!(mock.call_count(), 2);
}
