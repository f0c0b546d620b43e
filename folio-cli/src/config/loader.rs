use super::types::{
    FolioConfig, RawFolioConfig, RawRealtimeSection, RawServerConfig, RawSessionSection,
    RealtimeSection, ServerConfig, SessionSection,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<FolioConfig> {
        Self::load_from(Some(&Self::user_config_path()), &Self::project_config_path())
    }

    /// Load from explicit layer paths; missing files are skipped
    pub fn load_from(user_path: Option<&Path>, project_path: &Path) -> Result<FolioConfig> {
        let mut raw = RawFolioConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    fn read(path: &Path) -> Result<RawFolioConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn user_config_path() -> PathBuf {
        folio_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with FOLIO_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("FOLIO_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".folio/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawFolioConfig, overlay: RawFolioConfig) -> RawFolioConfig {
        RawFolioConfig {
            server: RawServerConfig {
                base_url: overlay.server.base_url.or(base.server.base_url),
                request_timeout_secs: overlay
                    .server
                    .request_timeout_secs
                    .or(base.server.request_timeout_secs),
            },
            session: RawSessionSection {
                login_path: overlay.session.login_path.or(base.session.login_path),
                dashboard_prefix: overlay
                    .session
                    .dashboard_prefix
                    .or(base.session.dashboard_prefix),
                landing_paths: overlay.session.landing_paths.or(base.session.landing_paths),
                cookie_ttl_secs: overlay.session.cookie_ttl_secs.or(base.session.cookie_ttl_secs),
                verify_cookie: overlay.session.verify_cookie.or(base.session.verify_cookie),
            },
            realtime: RawRealtimeSection {
                path: overlay.realtime.path.or(base.realtime.path),
                reconnect_delay_ms: overlay
                    .realtime
                    .reconnect_delay_ms
                    .or(base.realtime.reconnect_delay_ms),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawFolioConfig) -> FolioConfig {
        let server = ServerConfig::default();
        let session = SessionSection::default();
        let realtime = RealtimeSection::default();
        FolioConfig {
            server: ServerConfig {
                base_url: raw.server.base_url.unwrap_or(server.base_url),
                request_timeout_secs: raw
                    .server
                    .request_timeout_secs
                    .unwrap_or(server.request_timeout_secs),
            },
            session: SessionSection {
                login_path: raw.session.login_path.unwrap_or(session.login_path),
                dashboard_prefix: raw.session.dashboard_prefix.unwrap_or(session.dashboard_prefix),
                landing_paths: raw.session.landing_paths.unwrap_or(session.landing_paths),
                cookie_ttl_secs: raw.session.cookie_ttl_secs.unwrap_or(session.cookie_ttl_secs),
                verify_cookie: raw.session.verify_cookie.unwrap_or(session.verify_cookie),
            },
            realtime: RealtimeSection {
                path: raw.realtime.path.unwrap_or(realtime.path),
                reconnect_delay_ms: raw
                    .realtime
                    .reconnect_delay_ms
                    .unwrap_or(realtime.reconnect_delay_ms),
            },
        }
    }
}
