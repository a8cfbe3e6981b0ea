//! Access token provider for the playlist API
//!
//! The provider owns its cached token and refresh policy; it is handed to
//! whatever needs a token instead of living in process-wide state.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the provider-reported expiry
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Token endpoint returned {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Supplies bearer tokens for outbound requests
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, CredentialError>;
}

/// OAuth client credentials plus a long-lived refresh token
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Refresh-token grant against `<accounts_base>/api/token`
pub struct RefreshTokenProvider {
    http_client: reqwest::Client,
    token_url: String,
    credentials: OAuthCredentials,
    request_timeout: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshTokenProvider {
    pub fn new(
        http_client: reqwest::Client,
        accounts_base: &str,
        credentials: OAuthCredentials,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            token_url: format!("{}/api/token", accounts_base.trim_end_matches('/')),
            credentials,
            request_timeout,
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> Result<TokenResponse, CredentialError> {
        tracing::debug!(url = %self.token_url, "Refreshing access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| CredentialError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CredentialError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CredentialError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl CredentialProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<String, CredentialError> {
        // Held across the refresh so concurrent callers share one request
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.refresh().await?;

        match token.expires_in {
            Some(secs) => {
                let lifetime = Duration::from_secs(secs).saturating_sub(REFRESH_MARGIN);
                tracing::info!(expires_in_secs = secs, "Access token refreshed");
                *cached = Some(CachedToken {
                    access_token: token.access_token.clone(),
                    refresh_at: Instant::now() + lifetime,
                });
            }
            None => {
                tracing::info!("Access token refreshed without expiry, not caching");
                *cached = None;
            }
        }

        Ok(token.access_token)
    }
}
