use folio_core::SessionConfig;
use folio_core::config::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawFolioConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub session: RawSessionSection,

    #[serde(default)]
    pub realtime: RawRealtimeSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Reader server origin
    pub base_url: Option<String>,

    /// Timeout for ordinary requests
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSessionSection {
    pub login_path: Option<String>,
    pub dashboard_prefix: Option<String>,
    pub landing_paths: Option<Vec<String>>,
    pub cookie_ttl_secs: Option<u64>,
    pub verify_cookie: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRealtimeSection {
    pub path: Option<String>,
    pub reconnect_delay_ms: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FolioConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub realtime: RealtimeSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSection {
    pub login_path: String,
    pub dashboard_prefix: String,
    pub landing_paths: Vec<String>,
    pub cookie_ttl_secs: u64,
    pub verify_cookie: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            login_path: defaults.login_path,
            dashboard_prefix: defaults.dashboard_prefix,
            landing_paths: defaults.landing_paths,
            cookie_ttl_secs: defaults.cookie_ttl_secs,
            verify_cookie: defaults.verify_cookie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSection {
    pub path: String,
    pub reconnect_delay_ms: u64,
}

impl Default for RealtimeSection {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            path: defaults.realtime_path,
            reconnect_delay_ms: defaults.reconnect_delay_ms,
        }
    }
}

impl FolioConfig {
    /// Library settings for this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            base_url: self.server.base_url.clone(),
            request_timeout_secs: self.server.request_timeout_secs,
            login_path: self.session.login_path.clone(),
            dashboard_prefix: self.session.dashboard_prefix.clone(),
            landing_paths: self.session.landing_paths.clone(),
            cookie_ttl_secs: self.session.cookie_ttl_secs,
            verify_cookie: self.session.verify_cookie,
            realtime_path: self.realtime.path.clone(),
            reconnect_delay_ms: self.realtime.reconnect_delay_ms,
            ..SessionConfig::default()
        }
    }
}
