//! # Client Configuration
//!
//! Configuration for the registration client library and CLI. Every
//! controller receives the pieces it needs at construction; nothing reads
//! process-wide settings after startup.
//!
//! Supports environment variables, config files, and command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::models::OperatorIdentity;

/// Client configuration for API connections and orchestration timing
///
/// # Examples
///
/// ```rust
/// use registration_client::config::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.api.base_url, "http://localhost:8080/api/v1");
/// assert_eq!(config.registration.profile_fetch_delay_ms, 3000);
/// assert_eq!(config.console.refresh_interval_secs, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Registration/admin API connection
    pub api: ApiEndpointConfig,
    /// Submission flow timing
    pub registration: RegistrationConfig,
    /// Recovery console behaviour
    pub console: ConsoleConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpointConfig {
    /// Base URL including the API prefix (e.g., "<http://localhost:8080/api/v1>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Submission flow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Delay between a successful submit and the single aggregated-profile read
    pub profile_fetch_delay_ms: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            profile_fetch_delay_ms: 3000,
        }
    }
}

impl RegistrationConfig {
    #[must_use]
    pub fn profile_fetch_delay(&self) -> Duration {
        Duration::from_millis(self.profile_fetch_delay_ms)
    }
}

/// Recovery console configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Background refresh period
    pub refresh_interval_secs: u64,
    /// Identity sent as `adminUser` with retry commands
    pub operator: String,
    /// Notes attached to bulk DLQ retries
    pub bulk_retry_notes: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 10,
            operator: "admin@rsu.edu".to_string(),
            bulk_retry_notes: "Bulk retry from admin dashboard".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Background refresh period, never shorter than one second
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    #[must_use]
    pub fn operator_identity(&self) -> OperatorIdentity {
        OperatorIdentity::new(self.operator.clone())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables and config file
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (./registration-client.toml, ~/.registration-client/config.toml)
    /// 3. Default values
    pub fn load() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            debug!("Loading config from: {}", config_path.display());
            match Self::load_from_file(&config_path) {
                Ok(file_config) => config = file_config,
                Err(e) => {
                    debug!("Failed to load config file: {}", e);
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        debug!("Loaded client configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ClientError::config_error(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut possible_paths = vec![
            PathBuf::from("./registration-client.toml"),
            PathBuf::from("./config/registration-client.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            possible_paths.push(home.join(".registration-client").join("config.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            possible_paths.push(config_dir.join("registration-client").join("client.toml"));
        }

        possible_paths
            .into_iter()
            .find(|path| path.exists() && path.is_file())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REGISTRATION_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("REGISTRATION_API_TIMEOUT_MS") {
            if let Ok(timeout_ms) = timeout.parse() {
                self.api.timeout_ms = timeout_ms;
            }
        }
        if let Ok(delay) = std::env::var("REGISTRATION_PROFILE_DELAY_MS") {
            if let Ok(delay_ms) = delay.parse() {
                self.registration.profile_fetch_delay_ms = delay_ms;
            }
        }
        if let Ok(interval) = std::env::var("REGISTRATION_REFRESH_SECS") {
            if let Ok(secs) = interval.parse() {
                self.console.refresh_interval_secs = secs;
            }
        }
        if let Ok(operator) = std::env::var("REGISTRATION_OPERATOR") {
            self.console.operator = operator;
        }
        if let Ok(level) = std::env::var("REGISTRATION_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Reject settings that would make the controllers misbehave
    pub fn validate(&self) -> ClientResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ClientError::config_error("api.base_url must not be empty"));
        }
        if self.api.timeout_ms == 0 {
            return Err(ClientError::config_error("api.timeout_ms must be positive"));
        }
        if self.console.refresh_interval_secs == 0 {
            return Err(ClientError::config_error(
                "console.refresh_interval_secs must be positive",
            ));
        }
        if self.console.operator.trim().is_empty() {
            return Err(ClientError::config_error("console.operator must not be empty"));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::config_error(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config_error(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ClientError::config_error(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> ClientResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".registration-client").join("config.toml"))
    }
}
