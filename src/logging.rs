//! # Tracing Module
//!
//! Console logging for the registration client using the tracing ecosystem.
//! Library code only emits events; binaries call [`init_logging`] once.
//!
//! `RUST_LOG` wins over the configured level so a single run can be made
//! noisier without touching the config file.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Filter directive to install: `RUST_LOG` when set and non-empty, else the configured level
fn resolve_filter(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(config: &LoggingConfig) {
    TRACING_INITIALIZED.get_or_init(|| {
        let log_level = resolve_filter(config);
        let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

        let result = if config.json {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        } else {
            let use_ansi = IsTerminal::is_terminal(&std::io::stderr());
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        };

        if result.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::debug!(
                log_level = %log_level,
                json = config.json,
                "Registration client logging initialized"
            );
        }
    });
}
