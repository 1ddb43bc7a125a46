//! Bearer token acquisition for the backend.
//!
//! Tokens are obtained with the OAuth2 password grant and cached together
//! with their expiry, so callers never hold on to a stale token: an expired
//! token is renewed on the next request, and a token the server rejects can
//! be dropped with [`TokenProvider::invalidate`].

use crate::config::OAuthConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifetime assumed when the server omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Tokens are renewed this long before they actually expire
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Capability that hands out a valid bearer token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token, authenticating first if none is cached or it expired
    async fn access_token(&self) -> Result<String>;

    /// Forget the cached token so the next call re-authenticates
    async fn invalidate(&self);
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// OAuth2 password-grant token provider
pub struct PasswordGrantTokenProvider {
    client: Client,
    token_url: String,
    credentials: OAuthConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl PasswordGrantTokenProvider {
    /// `api_url` is the API root; the token endpoint is `{api_url}/token`
    pub fn new(client: Client, api_url: &str, credentials: OAuthConfig) -> Self {
        Self {
            client,
            token_url: format!("{}/token", api_url.trim_end_matches('/')),
            credentials,
            cached: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<CachedToken> {
        debug!("Requesting access token from {}", self.token_url);

        let form = [
            ("grant_type", "password"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Authentication rejected with status {}", status);
            return Err(Error::Auth(format!(
                "OAuth2 authentication failed with status {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Failed to parse token response: {e}")))?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        info!("Authenticated, token valid for {}s", lifetime.as_secs());

        Ok(CachedToken::new(token.access_token, lifetime))
    }
}

#[async_trait]
impl TokenProvider for PasswordGrantTokenProvider {
    async fn access_token(&self) -> Result<String> {
        // Held across the request so concurrent callers share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn invalidate(&self) {
        debug!("Dropping cached access token");
        *self.cached.lock().await = None;
    }
}

/// Provider that always returns the same token
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn invalidate(&self) {}
}
