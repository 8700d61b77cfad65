//! OAuth2 client-credentials token source.

use crate::api::config::ApiConfig;
use crate::api::models::TokenResponse;
use crate::api::traits::TokenSource;
use crate::error::{ExporterError, Result};
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Tokens are refreshed this long before the server-declared expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    /// `None` when the server did not declare a lifetime
    refresh_at: Option<Instant>,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        self.refresh_at.map_or(true, |at| now < at)
    }
}

/// When a token issued at `issued_at` should be replaced.
///
/// A lifetime too large to represent is treated as no expiry.
fn refresh_deadline(issued_at: Instant, expires_in: u64) -> Option<Instant> {
    issued_at.checked_add(Duration::from_secs(expires_in).saturating_sub(EXPIRY_MARGIN))
}

/// Obtains tokens with the client-credentials grant and caches them until
/// shortly before they expire.
pub struct ClientCredentialsTokenSource {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsTokenSource {
    /// Create a token source with its own HTTP client.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a token source that shares an existing HTTP client.
    pub fn with_client(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scopes: config.scopes.clone(),
            cached: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let scope = self.scopes.join(" ");
        let mut params = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }

        let requested_at = Instant::now();
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| ExporterError::auth_error(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExporterError::auth_error(format!(
                "token endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ExporterError::auth_error(format!("invalid token response: {}", e)))?;
        if body.access_token.is_empty() {
            return Err(ExporterError::auth_error("token endpoint returned an empty token"));
        }

        debug!(
            token_type = body.token_type.as_deref().unwrap_or("bearer"),
            expires_in = ?body.expires_in,
            "Obtained access token"
        );

        let refresh_at = body
            .expires_in
            .and_then(|secs| refresh_deadline(requested_at, secs));
        Ok(CachedToken {
            token: AccessToken::new(body.access_token),
            refresh_at,
        })
    }
}

impl TokenSource for ClientCredentialsTokenSource {
    async fn token(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(current) = cached.as_ref() {
            if current.is_valid(Instant::now()) {
                return Ok(current.token.clone());
            }
        }

        *cached = None;
        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

impl fmt::Debug for ClientCredentialsTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsTokenSource")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}
