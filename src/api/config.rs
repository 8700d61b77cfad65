//! Airthings cloud API configuration.

use crate::error::{ExporterError, Result};
use reqwest::Url;
use std::time::Duration;

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts-api.airthings.com/v1/token";

/// Default base URL of the Airthings cloud API.
pub const DEFAULT_API_URL: &str = "https://ext-api.airthings.com";

/// Default scope requested for the exporter's client.
pub const DEFAULT_SCOPES: &str = "read:device:current_values";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for talking to the Airthings cloud.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Scopes requested with every token
    pub scopes: Vec<String>,
    /// Token endpoint for the client-credentials grant
    pub token_url: Url,
    /// Base URL that `/v1/devices` is resolved against
    pub api_url: Url,
    /// Timeout applied to each outbound request
    pub request_timeout: Duration,
    /// Number of per-device sample requests allowed in flight within a scrape
    pub fetch_concurrency: usize,
}

impl ApiConfig {
    /// Create a configuration with the default endpoints and scopes.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: parse_scopes(DEFAULT_SCOPES),
            token_url: parse_url(DEFAULT_TOKEN_URL)?,
            api_url: parse_url(DEFAULT_API_URL)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fetch_concurrency: 1,
        })
    }

    /// Set the requested scopes from a comma-separated list.
    pub fn with_scopes(mut self, scopes: &str) -> Self {
        self.scopes = parse_scopes(scopes);
        self
    }

    /// Set the token endpoint.
    pub fn with_token_url(mut self, url: &str) -> Result<Self> {
        self.token_url = parse_url(url)?;
        Ok(self)
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        self.api_url = parse_url(url)?;
        Ok(self)
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set how many device sample requests may run at once.
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    /// Check the values that cannot be caught by parsing alone.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(ExporterError::config_error("client id must not be empty"));
        }
        if self.client_secret.is_empty() {
            return Err(ExporterError::config_error("client secret must not be empty"));
        }
        if self.fetch_concurrency == 0 {
            return Err(ExporterError::config_error(
                "fetch concurrency must be at least 1",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ExporterError::config_error("request timeout must be positive"));
        }
        Ok(())
    }
}

/// Split a comma-separated scope list, dropping blanks.
pub fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ExporterError::config_error(format!("Invalid URL {}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::new("id", "secret").unwrap();
        assert_eq!(config.scopes, vec!["read:device:current_values"]);
        assert_eq!(config.token_url.as_str(), DEFAULT_TOKEN_URL);
        assert_eq!(config.api_url.host_str(), Some("ext-api.airthings.com"));
        assert_eq!(config.fetch_concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_scopes() {
        assert_eq!(parse_scopes("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_scopes("").is_empty());
    }

    #[test]
    fn test_builder() {
        let config = ApiConfig::new("id", "secret")
            .unwrap()
            .with_scopes("read:device:current_values,read:device")
            .with_api_url("http://127.0.0.1:8080")
            .unwrap()
            .with_fetch_concurrency(4)
            .with_request_timeout(Duration::from_secs(3));

        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.api_url.port(), Some(8080));
        assert_eq!(config.fetch_concurrency, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_validation_failures() {
        assert!(ApiConfig::new("", "secret").unwrap().validate().is_err());
        assert!(ApiConfig::new("id", "").unwrap().validate().is_err());
        assert!(ApiConfig::new("id", "secret")
            .unwrap()
            .with_fetch_concurrency(0)
            .validate()
            .is_err());
        assert!(ApiConfig::new("id", "secret")
            .unwrap()
            .with_token_url("not a url")
            .is_err());
    }
}
