//! CLI module for the registration CLI tool
//!
//! This module organizes all CLI-related functionality including
//! command structures and their handlers.

pub mod commands;

pub use commands::{
    handle_admin_command, handle_config_command, handle_profile_command, handle_status_command,
    handle_submit_command,
};
