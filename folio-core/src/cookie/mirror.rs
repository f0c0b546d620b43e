//! Derived cookie copy of the session token

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::header::{SetCookie, cookie_pairs};
use super::jar::CookieJar;
use crate::token::SessionToken;

/// Writes, expires and reads the cookie that mirrors the session token
///
/// The cookie is only for requests that bypass the client (server-rendered
/// navigation). It is never read back as a source of the token.
#[derive(Clone)]
pub struct CookieMirror {
    jar: Arc<dyn CookieJar>,
    name: String,
    ttl: Duration,
}

impl CookieMirror {
    pub fn new(jar: Arc<dyn CookieJar>, name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            jar,
            name: name.into(),
            ttl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jar(&self) -> &Arc<dyn CookieJar> {
        &self.jar
    }

    /// Write the token, URL-encoded, with the configured lifetime
    pub fn write(&self, token: &SessionToken) {
        if token.is_empty() {
            debug!("Skipping cookie mirror for empty token");
            return;
        }
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        let cookie = SetCookie::new(
            self.name.as_str(),
            urlencoding::encode(token.as_str()).into_owned(),
            Utc::now() + ttl,
        );
        self.jar.set_cookie(&cookie.to_string());
    }

    /// Remove the cookie by writing an already-past expiry
    pub fn expire(&self) {
        let cookie = SetCookie::new(self.name.as_str(), "", DateTime::<Utc>::UNIX_EPOCH);
        self.jar.set_cookie(&cookie.to_string());
    }

    /// Raw values of every cookie carrying the mirror's name
    pub fn raw_values(&self) -> Vec<String> {
        let cookies = self.jar.cookie_string();
        cookie_pairs(&cookies)
            .filter(|(name, _)| *name == self.name)
            .map(|(_, value)| value.to_string())
            .collect()
    }

    /// First mirrored value, percent-decoded
    pub fn decoded(&self) -> Option<String> {
        self.raw_values()
            .into_iter()
            .next()
            .map(|raw| decode_or_raw(&raw))
    }

    /// Whether some mirrored value equals the token in encoded or decoded form
    pub fn matches(&self, token: &SessionToken) -> bool {
        self.raw_values().iter().any(|raw| {
            raw == token.as_str()
                || urlencoding::decode(raw).is_ok_and(|decoded| decoded == token.as_str())
        })
    }
}

fn decode_or_raw(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
