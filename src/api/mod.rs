//! Airthings cloud API access.
//!
//! This module wraps the two remote calls the exporter needs (device
//! inventory and per-device latest samples) and the OAuth2 client-credentials
//! exchange that authorizes them.

pub mod auth;
pub mod client;
pub mod config;
pub mod models;
pub mod traits;

// Re-export commonly used items
pub use auth::{AccessToken, ClientCredentialsTokenSource};
pub use client::HttpAirthingsClient;
pub use config::ApiConfig;
pub use models::{DeviceRecord, Location, SampleData, Segment};
pub use traits::{AirthingsApi, TokenSource};
