//! API Client Modules
//!
//! HTTP client for the registration and admin services, plus the adapter
//! that normalizes their failure payloads.

pub mod normalize;
pub mod registration_api_client;

pub use registration_api_client::RegistrationApiClient;
