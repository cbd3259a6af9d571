//! # Registration CLI Tool
//!
//! Command-line interface for submitting registrations and operating the
//! failed-registration recovery console.

mod cli;

use clap::{Args, Parser, Subcommand};
use registration_client::{ClientConfig, ErrorCategory, LoggingConfig, RetryStatus};
use tracing::info;

use cli::{
    handle_admin_command, handle_config_command, handle_profile_command, handle_status_command,
    handle_submit_command,
};

#[derive(Parser, Debug)]
#[command(name = "registration-cli")]
#[command(about = "Command-line interface for student registration and recovery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ~/.registration-client/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a registration and show routing, translation and profile
    Submit(SubmitArgs),

    /// Show registration and retry status for a student
    Status {
        /// Student ID
        #[arg(value_name = "STUDENT_ID")]
        student_id: String,
    },

    /// Show the aggregated cross-system profile for a student
    Profile {
        /// Student ID
        #[arg(value_name = "STUDENT_ID")]
        student_id: String,
    },

    /// Recovery console operations
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Student full name
    #[arg(long)]
    pub name: String,
    /// Student ID
    #[arg(long)]
    pub id: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Program of study
    #[arg(long)]
    pub program: String,
    /// Year level (First Year, Second Year, Third Year, Fourth Year)
    #[arg(long)]
    pub year: String,
    /// Return right after the submit instead of waiting for the profile read
    #[arg(long)]
    pub no_wait: bool,
    /// Save the registration XML into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Show recovery statistics
    Stats,
    /// List error log entries, optionally filtered
    Errors {
        /// Filter by error category (e.g. DATABASE_ERROR)
        #[arg(long)]
        category: Option<ErrorCategory>,
        /// Filter by failure stage
        #[arg(long)]
        stage: Option<String>,
        /// Filter by severity
        #[arg(long)]
        severity: Option<String>,
        /// Filter by student ID
        #[arg(long)]
        student_id: Option<String>,
        /// Filter by resolution state
        #[arg(long)]
        resolved: Option<bool>,
    },
    /// List failed messages
    Failed {
        /// Only messages in this retry status (e.g. PENDING_RETRY)
        #[arg(long)]
        status: Option<RetryStatus>,
    },
    /// List dead-letter queue entries with their retry history
    Dlq,
    /// Manually retry one failed message
    Retry {
        /// Failed message ID
        #[arg(value_name = "MESSAGE_ID")]
        message_id: i64,
        /// Notes recorded with the retry
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Operator identity (defaults to the configured operator)
        #[arg(long)]
        operator: Option<String>,
    },
    /// Retry every message in the dead-letter queue
    RetryAllDlq {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Operator identity (defaults to the configured operator)
        #[arg(long)]
        operator: Option<String>,
    },
    /// Show retry success and DLQ rates
    SuccessRate,
    /// Check the admin service health
    Health,
    /// Mount the console and print each background refresh
    Watch {
        /// Tab to watch (overview, errors, failed, dlq)
        #[arg(short, long, default_value = "overview")]
        tab: String,
        /// Error-log category filter
        #[arg(long)]
        category: Option<ErrorCategory>,
        /// Error-log stage filter
        #[arg(long)]
        stage: Option<String>,
        /// Stop after this many refreshes (default: run until interrupted)
        #[arg(long)]
        refreshes: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Destination (default: ~/.registration-client/config.toml)
        #[arg(short, long)]
        path: Option<String>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> registration_client::ClientResult<()> {
    let cli = Cli::parse();

    // Load configuration with precedence: --config > env/standard locations > defaults
    let config = if let Some(config_path) = cli.config {
        ClientConfig::load_from_file(std::path::Path::new(&config_path))?
    } else {
        ClientConfig::load()?
    };

    // Verbosity flags override the configured level
    let logging = LoggingConfig {
        level: match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        },
        json: cli.json_logs || config.logging.json,
    };
    registration_client::logging::init_logging(&logging);

    info!(
        base_url = %config.api.base_url,
        operator = %config.console.operator,
        "Registration CLI starting"
    );

    match cli.command {
        Commands::Submit(args) => handle_submit_command(args, &config).await,
        Commands::Status { student_id } => handle_status_command(&student_id, &config).await,
        Commands::Profile { student_id } => handle_profile_command(&student_id, &config).await,
        Commands::Admin(admin_cmd) => handle_admin_command(admin_cmd, &config).await,
        Commands::Config(config_cmd) => handle_config_command(config_cmd, &config).await,
    }
}
