//! Configuration for the backend connection and polling.
//!
//! Values come from a TOML file (explicit path, or the platform config
//! directory when present) and are then overridden by `UPA_*` environment
//! variables.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_LIMIT: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the platform directory holding `config.toml`
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("br", "upa", "upa-monitor").map(|dirs| dirs.config_dir().to_path_buf())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, without the `/api` suffix
    pub api_base_url: Option<String>,
    pub oauth: OAuthConfig,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Page size requested from the appointments endpoint
    pub request_limit: u32,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub log_level: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            oauth: OAuthConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_limit: DEFAULT_REQUEST_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, or from the platform config file if it exists, then apply env overrides
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => match get_config_dir().map(|dir| dir.join("config.toml")) {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path).await?,
                _ => Self::new(),
            },
        };

        config.merge_env_vars()?;
        Ok(config)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("UPA_API_BASE_URL") {
            self.api_base_url = Some(url);
        }
        if let Some(client_id) = lookup("UPA_OAUTH_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }
        if let Some(client_secret) = lookup("UPA_OAUTH_CLIENT_SECRET") {
            self.oauth.client_secret = client_secret;
        }
        if let Some(username) = lookup("UPA_OAUTH_USERNAME") {
            self.oauth.username = username;
        }
        if let Some(password) = lookup("UPA_OAUTH_PASSWORD") {
            self.oauth.password = password;
        }
        if let Some(interval) = lookup("UPA_POLL_INTERVAL") {
            self.poll_interval = humantime_serde::re::humantime::parse_duration(&interval)
                .map_err(|e| Error::Config(format!("Invalid UPA_POLL_INTERVAL '{interval}': {e}")))?;
        }
        if let Some(log_level) = lookup("UPA_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
        Ok(())
    }

    /// API root, i.e. the base URL with `/api` appended
    pub fn api_url(&self) -> Result<String> {
        let base = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| Error::Config("api_base_url is not set".to_string()))?;
        url::Url::parse(base)?;
        Ok(format!("{}/api", base.trim_end_matches('/')))
    }

    /// Check everything the HTTP data source needs is present
    pub fn validate(&self) -> Result<()> {
        self.api_url()?;

        let missing: Vec<&str> = [
            ("oauth.client_id", &self.oauth.client_id),
            ("oauth.client_secret", &self.oauth.client_secret),
            ("oauth.username", &self.oauth.username),
            ("oauth.password", &self.oauth.password),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing credentials: {}",
                missing.join(", ")
            )));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll_interval must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Config {
        Config::from_toml(
            r#"
            api_base_url = "http://10.0.2.2:8000/"
            poll_interval = "45s"

            [oauth]
            client_id = "mobile"
            client_secret = "s3cret"
            username = "painel"
            password = "hunter2"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.request_limit, 1000);
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_from_toml_with_partial_fields() {
        let config = complete();
        assert_eq!(config.poll_interval, Duration::from_secs(45));
        assert_eq!(config.request_limit, DEFAULT_REQUEST_LIMIT);
        assert_eq!(config.oauth.username, "painel");
    }

    #[test]
    fn test_api_url_appends_suffix() {
        assert_eq!(complete().api_url().unwrap(), "http://10.0.2.2:8000/api");
        assert!(Config::default().api_url().is_err());

        let mut config = complete();
        config.api_base_url = Some("10.0.2.2:8000".to_string());
        assert!(matches!(config.api_url(), Err(Error::Url(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = complete();
        let env: HashMap<&str, &str> = [
            ("UPA_API_BASE_URL", "https://fila.example.org"),
            ("UPA_OAUTH_PASSWORD", "rotated"),
            ("UPA_POLL_INTERVAL", "2m"),
        ]
        .into_iter()
        .collect();

        config
            .merge_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_url().unwrap(), "https://fila.example.org/api");
        assert_eq!(config.oauth.password, "rotated");
        assert_eq!(config.oauth.client_id, "mobile");
        assert_eq!(config.poll_interval, Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_env_interval_rejected() {
        let mut config = Config::default();
        let result = config.merge_env_from(|key| {
            (key == "UPA_POLL_INTERVAL").then(|| "often".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.oauth.client_secret.clear();
        config.oauth.password.clear();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("oauth.client_secret"));
        assert!(err.contains("oauth.password"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", complete().oauth);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("painel"));
    }
}
