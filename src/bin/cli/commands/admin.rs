//! Recovery console command handlers for the registration CLI

use dialoguer::Confirm;

use registration_client::models::{
    DlqEntry, ErrorLogEntry, ErrorLogQuery, FailedMessage, StatsSnapshot,
};
use registration_client::{
    AdminRecoveryController, ClientConfig, ClientError, ClientResult, ConfirmationPrompt,
    ConsoleSnapshot, ConsoleTab, OperatorIdentity, RetryOrchestrator, TokioScheduler,
};

use super::build_api;
use crate::AdminCommands;

/// Asks on the terminal; a failed prompt declines
struct TerminalPrompt;

impl ConfirmationPrompt for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn operator_for(operator: Option<String>, config: &ClientConfig) -> OperatorIdentity {
    operator
        .filter(|o| !o.trim().is_empty())
        .map(OperatorIdentity::new)
        .unwrap_or_else(|| config.console.operator_identity())
}

async fn mount_console(config: &ClientConfig) -> ClientResult<AdminRecoveryController> {
    let api = build_api(config)?;
    Ok(AdminRecoveryController::mount(api, TokioScheduler::shared(), config.console.clone()).await)
}

pub async fn handle_admin_command(cmd: AdminCommands, config: &ClientConfig) -> ClientResult<()> {
    match cmd {
        AdminCommands::Stats => {
            let api = build_api(config)?;
            match api.get_stats().await {
                Ok(stats) => print_stats(&stats),
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("load stats"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Errors {
            category,
            stage,
            severity,
            student_id,
            resolved,
        } => {
            let api = build_api(config)?;
            let query = ErrorLogQuery {
                category,
                stage,
                severity,
                resolved,
                student_id,
            };
            let result = if query.is_filtered() {
                api.search_error_logs(&query).await
            } else {
                api.list_error_logs().await
            };
            match result {
                Ok(entries) => print_error_logs(&entries),
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("load error logs"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Failed { status } => {
            let api = build_api(config)?;
            let result = match status {
                Some(status) => api.list_failed_messages_by_status(status).await,
                None => api.list_failed_messages().await,
            };
            match result {
                Ok(messages) => print_failed_messages(&messages),
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("load failed messages"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Dlq => {
            let api = build_api(config)?;
            match api.list_dlq_entries().await {
                Ok(entries) => print_dlq(&entries),
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("load DLQ"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Retry {
            message_id,
            notes,
            operator,
        } => {
            let console = mount_console(config).await?;
            let retry = console.retry_orchestrator(operator_for(operator, config));
            println!(
                "Retrying message {} as {}",
                message_id,
                retry.operator()
            );

            retry.open_retry_dialog(message_id);
            retry.set_notes(notes);
            let outcome = retry.submit_retry_dialog().await;
            console.unmount();

            match outcome {
                Ok(receipt) => {
                    println!("✓ {}", receipt.message);
                    print_post_command_summary(&console.snapshot());
                }
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("retry message"));
                    return Err(e);
                }
            }
        }
        AdminCommands::RetryAllDlq { yes, operator } => {
            let console = mount_console(config).await?;
            console.select_tab(ConsoleTab::Dlq).await;
            let retry = console.retry_orchestrator(operator_for(operator, config));

            let outcome = run_bulk_retry(&retry, yes).await;
            console.unmount();

            match outcome {
                Ok(Some(report)) => {
                    println!(
                        "✓ Bulk retry completed: {} total, {} succeeded, {} failed",
                        report.total_messages, report.success_count, report.failure_count
                    );
                    print_post_command_summary(&console.snapshot());
                }
                Ok(None) => println!("Bulk retry cancelled"),
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("retry DLQ messages"));
                    return Err(e);
                }
            }
        }
        AdminCommands::SuccessRate => {
            let api = build_api(config)?;
            match api.get_retry_success_rate().await {
                Ok(rate) => {
                    println!("✓ Retry success rate\n");
                    println!("  Total messages: {}", rate.total_messages);
                    println!("  Resolved: {}", rate.resolved_messages);
                    println!("  In DLQ: {}", rate.messages_in_dlq);
                    println!("  Success rate: {}", rate.success_rate);
                    println!("  DLQ rate: {}", rate.dlq_rate);
                }
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("load retry success rate"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Health => {
            let api = build_api(config)?;
            match api.get_admin_health().await {
                Ok(health) => {
                    let marker = if health.is_up() { "✓" } else { "✗" };
                    println!("{} Admin service: {}", marker, health.status);
                    for (name, value) in [
                        ("Dashboard", &health.admin_dashboard),
                        ("Error tracking", &health.error_tracking),
                        ("Retry scheduler", &health.retry_scheduler),
                    ] {
                        if let Some(value) = value {
                            println!("  {}: {}", name, value);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("✗ {}", e.user_message("check admin health"));
                    return Err(e);
                }
            }
        }
        AdminCommands::Watch {
            tab,
            category,
            stage,
            refreshes,
        } => {
            let tab: ConsoleTab = tab.parse().map_err(ClientError::InvalidInput)?;
            let console = mount_console(config).await?;
            console.set_category_filter(category).await;
            console.set_stage_filter(stage).await;
            console.select_tab(tab).await;

            let interval = config.console.refresh_interval();
            println!(
                "Watching {} (refresh every {}s, Ctrl-C to stop)\n",
                tab,
                interval.as_secs()
            );
            print_console(&console.snapshot());

            let mut printed = 0u32;
            loop {
                if refreshes.is_some_and(|limit| printed >= limit) {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        printed += 1;
                        println!("\n--- refresh {} ---", printed);
                        print_console(&console.snapshot());
                    }
                    _ = tokio::signal::ctrl_c() => {
                        break;
                    }
                }
            }
            console.unmount();
        }
    }

    Ok(())
}

async fn run_bulk_retry(
    retry: &RetryOrchestrator,
    assume_yes: bool,
) -> ClientResult<Option<registration_client::models::BulkRetryReport>> {
    if assume_yes {
        let confirmation = retry.request_retry_all_dlq();
        retry.retry_all_dlq(confirmation.confirm()).await.map(Some)
    } else {
        retry.retry_all_dlq_with(&TerminalPrompt).await
    }
}

fn print_stats(stats: &StatsSnapshot) {
    println!("✓ Recovery statistics\n");
    println!("  Failed messages: {}", stats.total_failed_messages);
    println!("  In DLQ: {}", stats.messages_in_dlq);
    println!("  Pending retry: {}", stats.pending_retry);
    if let Some(retrying) = stats.retrying {
        println!("  Retrying: {}", retrying);
    }
    println!("  Retry success: {}", stats.retry_success);
    println!("  Awaiting manual retry: {}", stats.awaiting_manual_retry);
    println!("  Manual retry success: {}", stats.manual_retry_success);
    if let Some(failed) = stats.failed {
        println!("  Permanently failed: {}", failed);
    }
    println!(
        "  Errors: {} total, {} unresolved",
        stats.total_errors, stats.unresolved_errors
    );

    if !stats.errors_by_category.is_empty() {
        println!("\n  Errors by category:");
        for (category, count) in &stats.errors_by_category {
            println!("    {}: {}", category, count);
        }
    }
    if !stats.errors_by_stage.is_empty() {
        println!("\n  Errors by stage:");
        for (stage, count) in &stats.errors_by_stage {
            println!("    {}: {}", stage, count);
        }
    }
}

fn print_error_logs(entries: &[ErrorLogEntry]) {
    println!("✓ Found {} error log entries\n", entries.len());
    for entry in entries {
        println!(
            "  • [{}] {} / {} ({})",
            entry.id, entry.error_stage, entry.error_category, entry.severity
        );
        if let Some(ts) = entry.error_timestamp {
            println!("    At: {}", ts);
        }
        if let (Some(name), Some(id)) = (&entry.student_name, &entry.student_id) {
            println!("    Student: {} ({})", name, id);
        }
        println!("    {}", entry.error_message);
        println!("    Resolved: {}", if entry.resolved { "yes" } else { "no" });
    }
}

fn print_failed_messages(messages: &[FailedMessage]) {
    println!("✓ Found {} failed messages\n", messages.len());
    for message in messages {
        println!(
            "  • [{}] {} ({}) - {}",
            message.id, message.student_name, message.student_id, message.status
        );
        if let Some(stage) = &message.failure_stage {
            println!("    Stage: {} / {}", stage, message.error_category);
        }
        println!(
            "    Attempts: {}/{}",
            message.retry_attempts, message.max_retry_attempts
        );
        if let Some(next) = message.scheduled_retry() {
            println!("    Next retry: {}", next);
        }
        if let Some(error) = &message.error_message {
            println!("    Error: {}", error);
        }
    }
}

fn print_dlq(entries: &[DlqEntry]) {
    println!("✓ Found {} DLQ entries\n", entries.len());
    for entry in entries {
        let message = &entry.message;
        println!(
            "  • [{}] {} ({}) - {}",
            message.id, message.student_name, message.student_id, message.status
        );
        if let Some(email) = &entry.email {
            println!("    Email: {}", email);
        }
        if let Some(moved) = entry.moved_to_dlq_at {
            println!("    Moved to DLQ: {}", moved);
        }
        if !entry.retry_history.is_empty() {
            println!("    Retry history:");
            for attempt in &entry.retry_history {
                println!("      {}", attempt.raw);
            }
        }
    }
}

fn print_post_command_summary(snapshot: &ConsoleSnapshot) {
    println!(
        "\n  Now: {} failed messages, {} in DLQ",
        snapshot.failed_messages.len(),
        snapshot.dlq_entries.len()
    );
    if let Some(stats) = &snapshot.stats {
        println!(
            "  Awaiting manual retry: {}, manual retry success: {}",
            stats.awaiting_manual_retry, stats.manual_retry_success
        );
    }
}

fn print_console(snapshot: &ConsoleSnapshot) {
    if let Some(stats) = &snapshot.stats {
        println!(
            "Stats: {} failed, {} in DLQ, {} pending retry, {} unresolved errors",
            stats.total_failed_messages,
            stats.messages_in_dlq,
            stats.pending_retry,
            stats.unresolved_errors
        );
    } else {
        println!("Stats: not loaded");
    }

    match snapshot.active_tab {
        ConsoleTab::Overview => {}
        ConsoleTab::ErrorLogs => print_error_logs(&snapshot.error_logs),
        ConsoleTab::FailedMessages => print_failed_messages(&snapshot.failed_messages),
        ConsoleTab::Dlq => print_dlq(&snapshot.dlq_entries),
    }
}
