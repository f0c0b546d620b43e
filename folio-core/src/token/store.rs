//! Single source of truth for the session token

use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::TokenStorage;
use super::types::SessionToken;
use crate::config::SessionConfig;
use crate::cookie::{CookieJar, CookieMirror};

/// Owns the tab-local token and its cookie mirror
///
/// `set` and `clear` are the only writers of the token; every other
/// component reads through `get`. Storage failures are logged and treated
/// as an absent token.
pub struct TokenStore {
    storage: Arc<dyn TokenStorage>,
    key: String,
    mirror: CookieMirror,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn TokenStorage>, key: impl Into<String>, mirror: CookieMirror) -> Self {
        Self {
            storage,
            key: key.into(),
            mirror,
        }
    }

    /// Build a store with key, cookie name and lifetime from `config`
    pub fn from_config(
        storage: Arc<dyn TokenStorage>,
        jar: Arc<dyn CookieJar>,
        config: &SessionConfig,
    ) -> Self {
        let mirror = CookieMirror::new(jar, config.cookie_name.as_str(), config.cookie_ttl());
        Self::new(storage, config.token_key.as_str(), mirror)
    }

    /// Current token, if any
    pub fn get(&self) -> Option<SessionToken> {
        match self.storage.get_item(&self.key) {
            Ok(Some(value)) if !value.is_empty() => Some(SessionToken::new(value)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Store the token, then mirror it into the cookie
    pub fn set(&self, token: &SessionToken) {
        if let Err(e) = self.storage.set_item(&self.key, token.as_str()) {
            warn!(error = %e, "Failed to store session token");
            return;
        }
        debug!("Session token stored");
        self.mirror.write(token);
    }

    /// Remove the token and expire the cookie immediately
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!(error = %e, "Failed to remove session token");
        }
        self.mirror.expire();
        debug!("Session token cleared");
    }

    pub fn mirror(&self) -> &CookieMirror {
        &self.mirror
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
