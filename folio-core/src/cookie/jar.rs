//! Cookie jar backends
//!
//! A [`CookieJar`] is the script-visible view of a cookie store: it can be
//! read as one `name=value; ...` string and written one cookie at a time.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::cookie::CookieStore;
use tracing::warn;

use super::header::parse_set_cookie;

/// Script-visible cookie store for the reader origin
pub trait CookieJar: Send + Sync {
    /// All live cookies as `name=value; name2=value2`
    fn cookie_string(&self) -> String;

    /// Apply one `Set-Cookie` style write; an expired write deletes
    fn set_cookie(&self, cookie: &str);
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

/// In-process cookie jar with expiry handling
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    writes: AtomicUsize,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes applied so far, deletions included
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_string(&self) -> String {
        let now = Utc::now();
        let cookies = self
            .cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cookies
            .iter()
            .filter(|c| c.expires.is_none_or(|expires| expires > now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, cookie: &str) {
        let Some(parsed) = parse_set_cookie(cookie) else {
            warn!("Ignoring malformed cookie write");
            return;
        };
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut cookies = self
            .cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cookies.retain(|c| c.name != parsed.name);
        if !parsed.is_expired_at(Utc::now()) {
            cookies.push(StoredCookie {
                name: parsed.name,
                value: parsed.value,
                expires: parsed.expires,
            });
        }
    }
}

/// Jar shared with a `reqwest::Client`, so requests to the reader origin
/// carry the mirrored cookie the way full-page navigations do
pub struct HttpCookieJar {
    jar: Arc<reqwest::cookie::Jar>,
    origin: Url,
}

impl HttpCookieJar {
    pub fn new(origin: Url) -> Self {
        Self {
            jar: Arc::new(reqwest::cookie::Jar::default()),
            origin,
        }
    }

    /// The underlying store, for `ClientBuilder::cookie_provider`
    pub fn store(&self) -> Arc<reqwest::cookie::Jar> {
        self.jar.clone()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

impl CookieJar for HttpCookieJar {
    fn cookie_string(&self) -> String {
        self.jar
            .cookies(&self.origin)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .unwrap_or_default()
    }

    fn set_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.origin);
    }
}
