#![allow(dead_code)]

pub mod fixtures;
pub mod mock_api;

pub use fixtures::*;
pub use mock_api::*;
