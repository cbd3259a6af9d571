//! Registration command handlers for the registration CLI

use std::sync::Arc;
use std::time::Duration;

use registration_client::models::RegistrationInput;
use registration_client::{
    AggregatedProfile, ClientConfig, ClientResult, FileArtifactSink, ProfileState,
    SubmissionCoordinator, SubmissionResult, TokioScheduler,
};

use super::build_api;
use crate::SubmitArgs;

pub async fn handle_submit_command(args: SubmitArgs, config: &ClientConfig) -> ClientResult<()> {
    let api = build_api(config)?;
    let coordinator = SubmissionCoordinator::new(
        Arc::clone(&api),
        TokioScheduler::shared(),
        config.registration.clone(),
    );

    coordinator.set_input(RegistrationInput {
        student_name: args.name.clone(),
        student_id: args.id.clone(),
        email: args.email,
        program: args.program,
        year_level: args.year,
    });

    println!("Submitting registration for {} ({})", args.name, args.id);
    let result = match coordinator.submit().await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("✗ {}", e.user_message("submit registration"));
            return Err(e);
        }
    };
    print_submission(&result);

    if let Some(dir) = args.export_dir {
        match coordinator
            .export_artifact(&FileArtifactSink::new(dir))
            .await
        {
            Ok(path) => println!("✓ Saved XML export to {}", path.display()),
            Err(e) => eprintln!("✗ {}", e.user_message("download XML")),
        }
    }

    if args.no_wait {
        return Ok(());
    }

    let delay = config.registration.profile_fetch_delay();
    println!(
        "\nWaiting {}ms for cross-system aggregation...",
        delay.as_millis()
    );
    tokio::time::sleep(delay).await;

    let deadline = tokio::time::Instant::now() + Duration::from_millis(config.api.timeout_ms);
    while (coordinator.profile_fetch_armed() || coordinator.profile_state().is_loading())
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    match coordinator.profile_state() {
        ProfileState::Complete(profile) => print_profile(&profile),
        _ => println!(
            "Aggregated profile not available yet; try `registration-cli profile {}` later",
            result.student_id
        ),
    }

    coordinator.teardown();
    Ok(())
}

pub async fn handle_status_command(student_id: &str, config: &ClientConfig) -> ClientResult<()> {
    let api = build_api(config)?;

    match api.get_registration_status(student_id).await {
        Ok(status) => {
            if !status.registered {
                println!("✗ No registration found for {}", student_id);
                if let Some(message) = &status.user_message {
                    println!("  {}", message);
                }
                return Ok(());
            }

            println!("✓ Registration status for {}\n", student_id);
            if let Some(name) = &status.student_name {
                println!("  Student: {}", name);
            }
            if let Some(program) = &status.program {
                println!("  Program: {}", program);
            }
            if let Some(year) = &status.year_level {
                println!("  Year level: {}", year);
            }
            if let Some(state) = &status.registration_status {
                println!("  Registration status: {}", state);
            }
            if status.has_error {
                if let Some(retry_status) = status.retry_status {
                    println!("  Retry status: {}", retry_status);
                }
                if let (Some(attempts), Some(max)) =
                    (status.retry_attempts, status.max_retry_attempts)
                {
                    println!("  Retry attempts: {}/{}", attempts, max);
                }
                if status.in_dead_letter_queue == Some(true) {
                    println!("  In dead-letter queue: awaiting manual retry");
                }
            }
            if let Some(message) = &status.user_message {
                println!("\n  {}", message);
            }
        }
        Err(e) => {
            eprintln!("✗ {}", e.user_message("get registration status"));
            return Err(e);
        }
    }

    Ok(())
}

pub async fn handle_profile_command(student_id: &str, config: &ClientConfig) -> ClientResult<()> {
    let api = build_api(config)?;

    match api.get_aggregated_profile(student_id).await {
        Ok(profile) => print_profile(&profile),
        Err(e) => {
            eprintln!("✗ {}", e.user_message("get aggregated profile"));
            return Err(e);
        }
    }

    Ok(())
}

fn print_submission(result: &SubmissionResult) {
    println!("✓ {}", result.message);
    if let Some(id) = result.registration_id {
        println!("  Registration ID: {}", id);
    }
    if let Some(status) = &result.status {
        println!("  Status: {}", status);
    }

    if let Some(routing) = &result.routing {
        println!("\n  Content-based routing:");
        println!(
            "    Student type: {}",
            if routing.is_first_year {
                "First year"
            } else {
                "Returning"
            }
        );
        println!("    Routed to: {}", routing.routed_to.join(", "));
        if !routing.routing_message.is_empty() {
            println!("    {}", routing.routing_message);
        }
    }

    if let Some(chain) = &result.translation {
        println!("\n  Translation chain: {}", chain.format_path());
        for (index, step) in chain.steps.iter().enumerate() {
            println!(
                "    {}. {} ({} → {}) {}ms",
                index + 1,
                step.translator_name,
                step.from_format,
                step.to_format,
                step.duration_ms
            );
        }
        println!(
            "    Total: {}ms ({})",
            chain.total_translation_time_ms,
            if chain.successful {
                "successful"
            } else {
                "failed"
            }
        );
    }
}

fn print_profile(profile: &AggregatedProfile) {
    println!("\n✓ Aggregated profile for {}", profile.student_id);
    if let Some(name) = &profile.student_name {
        println!("  Student: {}", name);
    }
    if let Some(program) = &profile.program {
        println!("  Program: {}", program);
    }
    if let Some(year) = &profile.year_level {
        println!("  Year level: {}", year);
    }
    println!(
        "  Aggregation: {} ({}/{} responses, {:.0}%) in {}ms",
        profile.aggregation_status,
        profile.responses_received,
        profile.responses_expected,
        profile.completion_percentage(),
        profile.aggregation_time_ms
    );

    let fragments = [
        ("Academic records", &profile.academic_records),
        ("Housing", &profile.housing),
        ("Billing", &profile.billing),
        ("Library", &profile.library),
    ];
    for (label, fragment) in fragments {
        if let Some(fragment) = fragment {
            println!("\n  {}:", label);
            for (field, value) in fragment {
                println!("    {}: {}", field, value);
            }
        }
    }
}
