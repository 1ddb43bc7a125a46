//! Authenticated JSON client with a single re-authentication retry

use crate::auth::TokenProvider;
use crate::error::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ApiClient {
    client: Client,
    api_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(client: Client, api_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Build the shared HTTP client
    pub fn http_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// GET `{api_url}{path}` with query parameters and decode the JSON body.
    ///
    /// A 401 drops the cached token and the request is sent once more with a
    /// fresh one.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);

        let mut response = self.send(&url, query).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Token rejected for {}, re-authenticating", path);
            self.tokens.invalidate().await;
            response = self.send(&url, query).await?;
        }

        match response.status() {
            status if status.is_success() => response.json().await.map_err(|e| {
                Error::Deserialization(format!("Failed to parse response from {path}: {e}"))
            }),
            StatusCode::NOT_FOUND => Err(Error::NotFound(path.to_string())),
            StatusCode::UNAUTHORIZED => Err(Error::Auth(format!("Access to {path} denied"))),
            status => Err(status.into()),
        }
    }

    async fn send(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        debug!("GET {} {:?}", url, query);

        self.client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {url} failed: {e}")))
    }
}
