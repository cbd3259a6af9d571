//! Command handlers for the registration CLI
//!
//! Decomposed by command category.

pub mod admin;
pub mod config;
pub mod register;

pub use admin::handle_admin_command;
pub use config::handle_config_command;
pub use register::{handle_profile_command, handle_status_command, handle_submit_command};

use std::sync::Arc;

use registration_client::{ClientConfig, ClientResult, RegistrationApi, RegistrationApiClient};

/// Shared REST client for a command invocation
pub(crate) fn build_api(config: &ClientConfig) -> ClientResult<Arc<dyn RegistrationApi>> {
    Ok(Arc::new(RegistrationApiClient::from_client_config(config)?))
}
