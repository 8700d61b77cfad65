//! `reqwest` implementation of the Airthings cloud API.

use crate::api::auth::AccessToken;
use crate::api::config::ApiConfig;
use crate::api::models::{DeviceRecord, DevicesResponse, LatestSamplesResponse, SampleData};
use crate::api::traits::AirthingsApi;
use crate::error::{ExporterError, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Airthings cloud API client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpAirthingsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpAirthingsClient {
    /// Create a client with its own connection pool.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client that shares an existing connection pool.
    pub fn with_client(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.api_url.clone(),
        }
    }

    /// Build `{base}/v1/devices[/{segments}...]`, percent-encoding each segment.
    fn endpoint(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ExporterError::config_error(format!(
                    "API URL {} cannot be used as a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v1", "devices"])
            .extend(extra);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, token: &AccessToken) -> Result<T> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token.secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ExporterError::decode_error(format!("{}: {}", url, e)))
    }
}

impl AirthingsApi for HttpAirthingsClient {
    async fn fetch_inventory(&self, token: &AccessToken) -> Result<Vec<DeviceRecord>> {
        let url = self.endpoint(&[])?;
        let body: DevicesResponse = self.get_json(url, token).await?;
        Ok(body.devices)
    }

    async fn fetch_latest_samples(
        &self,
        token: &AccessToken,
        device_id: &str,
    ) -> Result<SampleData> {
        let url = self.endpoint(&[device_id, "latest-samples"])?;
        let body: LatestSamplesResponse = self.get_json(url, token).await?;
        Ok(body.data)
    }
}
