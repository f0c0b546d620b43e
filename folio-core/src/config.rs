//! Configuration for the reader session layer

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default reader server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Settings shared by the token store, cookie mirror, realtime channel and
/// session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reader server origin, e.g. `http://localhost:8080`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Key of the token in tab-local storage
    #[serde(default = "default_token_key")]
    pub token_key: String,

    /// Name of the mirrored cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Lifetime of the mirrored cookie in seconds
    #[serde(default = "default_cookie_ttl_secs")]
    pub cookie_ttl_secs: u64,

    /// Where logout and forced logout navigate to
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path prefix of pages that run their own session controller
    #[serde(default = "default_dashboard_prefix")]
    pub dashboard_prefix: String,

    /// Pages that never show the identity panel
    #[serde(default = "default_landing_paths")]
    pub landing_paths: Vec<String>,

    /// Server-push endpoint
    #[serde(default = "default_realtime_path")]
    pub realtime_path: String,

    /// Fixed delay between realtime reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// How long the cookie-sync in-flight guard stays set
    #[serde(default = "default_cookie_guard_ms")]
    pub cookie_guard_ms: u64,

    /// Delay before the cookie write is verified
    #[serde(default = "default_cookie_verify_ms")]
    pub cookie_verify_ms: u64,

    /// Whether to re-read the cookie after a write and retry once
    #[serde(default = "default_verify_cookie")]
    pub verify_cookie: bool,

    /// Timeout for ordinary HTTP requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_key() -> String {
    "auth_token".to_string()
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

fn default_cookie_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_login_path() -> String {
    "/reader/login".to_string()
}

fn default_dashboard_prefix() -> String {
    "/consultant".to_string()
}

fn default_landing_paths() -> Vec<String> {
    vec!["/".to_string(), "/login".to_string(), "/register".to_string()]
}

fn default_realtime_path() -> String {
    "/api/realtime/events".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_cookie_guard_ms() -> u64 {
    100
}

fn default_cookie_verify_ms() -> u64 {
    200
}

fn default_verify_cookie() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_key: default_token_key(),
            cookie_name: default_cookie_name(),
            cookie_ttl_secs: default_cookie_ttl_secs(),
            login_path: default_login_path(),
            dashboard_prefix: default_dashboard_prefix(),
            landing_paths: default_landing_paths(),
            realtime_path: default_realtime_path(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            cookie_guard_ms: default_cookie_guard_ms(),
            cookie_verify_ms: default_cookie_verify_ms(),
            verify_cookie: default_verify_cookie(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SessionConfig {
    /// Create a config for the given server with every other value defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Check the base URL and every configured path
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base()?;
        for path in [&self.login_path, &self.realtime_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }
        // Empty disables alternate-dashboard detection
        if !self.dashboard_prefix.is_empty() && !self.dashboard_prefix.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.dashboard_prefix.clone()));
        }
        Ok(())
    }

    /// Parsed server origin
    pub fn base(&self) -> Result<Url, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "expected an http:// or https:// URL with a host".to_string(),
            });
        }
        Ok(url)
    }

    /// Absolute URL of a server path
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidPath(path.to_string()));
        }
        self.base()?
            .join(path)
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn cookie_guard_window(&self) -> Duration {
        Duration::from_millis(self.cookie_guard_ms)
    }

    pub fn cookie_verify_delay(&self) -> Duration {
        Duration::from_millis(self.cookie_verify_ms)
    }

    pub fn cookie_ttl(&self) -> Duration {
        Duration::from_secs(self.cookie_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether `path` is a landing page (no identity panel)
    pub fn is_landing_path(&self, path: &str) -> bool {
        self.landing_paths.iter().any(|p| p == path)
    }
}
