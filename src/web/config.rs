//! Web server configuration.

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Path the metrics page is served on.
pub const METRICS_PATH: &str = "/metrics";

/// Configuration for the web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address to listen on, as `host:port`
    pub listen_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: crate::DEFAULT_LISTEN_ADDRESS.to_string(),
        }
    }
}

impl WebConfig {
    /// Create a new web configuration listening on `listen_address`.
    pub fn new(listen_address: impl Into<String>) -> Self {
        Self {
            listen_address: listen_address.into(),
        }
    }

    /// Set the listen address.
    pub fn with_listen_address(mut self, listen_address: impl Into<String>) -> Self {
        self.listen_address = listen_address.into();
        self
    }

    /// Path the metrics page is served on.
    pub fn metrics_path(&self) -> &'static str {
        METRICS_PATH
    }

    /// Parse the listen address.
    ///
    /// An empty host (`:9101`) binds every IPv4 interface.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let address = match self.listen_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => self.listen_address.clone(),
        };
        address.parse::<SocketAddr>().map_err(|e| {
            ExporterError::config_error(format!(
                "Invalid listen address {}: {}",
                self.listen_address, e
            ))
        })
    }
}
