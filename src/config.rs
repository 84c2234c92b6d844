//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
const CREDENTIALS_FILE: &str = "credentials.json";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and authority of the backend, without trailing slash.
    pub base_url: String,
    /// Path prefix every endpoint hangs off, e.g. `/api`.
    pub api_prefix: String,
    /// Whole-request timeout; expiry surfaces as a transport error.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            credentials_path: default_credentials_path(std::env::var("HOME").ok().as_deref()),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `KB_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `KB_API_PREFIX`: default `/api`
    /// - `KB_TIMEOUT_MS`: default 30000
    /// - `KB_CONNECT_TIMEOUT_MS`: default 10000
    /// - `KB_CREDENTIALS_PATH`: default `$HOME/.kb/credentials.json`
    ///
    /// # Errors
    ///
    /// Returns an error if `KB_BASE_URL` is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(std::env::var("KB_BASE_URL").ok().as_deref())?;
        let api_prefix = normalize_prefix(std::env::var("KB_API_PREFIX").ok().as_deref());
        let timeout = Duration::from_millis(env_parse_u64("KB_TIMEOUT_MS", DEFAULT_TIMEOUT_MS));
        let connect_timeout =
            Duration::from_millis(env_parse_u64("KB_CONNECT_TIMEOUT_MS", DEFAULT_CONNECT_TIMEOUT_MS));
        let credentials_path = std::env::var("KB_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_credentials_path(std::env::var("HOME").ok().as_deref()));

        Ok(Self { base_url, api_prefix, timeout, connect_timeout, credentials_path })
    }

    /// Absolute URL that endpoint paths are appended to.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}{}", self.base_url, self.api_prefix)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let url = raw.map_or(DEFAULT_BASE_URL, str::trim).trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            var: "KB_BASE_URL",
            reason: format!("'{url}' must start with http:// or https://"),
        });
    }
    Ok(url.to_string())
}

fn normalize_prefix(raw: Option<&str>) -> String {
    let trimmed = raw.map_or(DEFAULT_API_PREFIX, str::trim).trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}

fn default_credentials_path(home: Option<&str>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(".kb").join(CREDENTIALS_FILE),
        _ => PathBuf::from(".kb-credentials.json"),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
