//! Remote notes service module
//!
//! Client and payload shapes for the REST API consumed in API mode.

pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::UserInfo;
