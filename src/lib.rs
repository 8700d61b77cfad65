//! # Airthings Exporter
//!
//! Polls the Airthings cloud API for the latest readings of every sensor on an
//! account and republishes them as Prometheus gauges.
//!
//! ## Features
//!
//! - **Scrape-driven**: the cloud is queried only when `/metrics` is scraped
//! - **Cached inventory**: the device list is refreshed at most every 30 minutes
//! - **Failure isolation**: a failing device never hides the other devices' readings
//! - **Serialized scrapes**: overlapping scrapes never overlap their API calls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airthings_exporter::{
//!     start_web_server, AirthingsCollector, ApiConfig, ClientCredentialsTokenSource,
//!     HttpAirthingsClient, WebConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::new("client-id", "client-secret")?;
//!     let collector = AirthingsCollector::new(
//!         HttpAirthingsClient::new(&config)?,
//!         ClientCredentialsTokenSource::new(&config)?,
//!     );
//!
//!     start_web_server(WebConfig::default(), Arc::new(collector)).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod metrics;
pub mod web;

// Re-export public API
pub use api::{
    AccessToken, AirthingsApi, ApiConfig, ClientCredentialsTokenSource, HttpAirthingsClient,
    TokenSource,
};
pub use error::{ExporterError, Result};
pub use metrics::{
    encode_records, AirthingsCollector, Device, DeviceInventory, MetricDescriptor, MetricRecord,
};
pub use web::{create_app, start_web_server, WebConfig};

/// The default address the exporter listens on
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9101";
