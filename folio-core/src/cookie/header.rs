//! Cookie string parsing and formatting
//!
//! Two shapes are handled: the `name=value; name2=value2` string a cookie
//! jar exposes to script, and the single `Set-Cookie` style string written
//! into it (`name=value; expires=...; path=/; SameSite=Lax`).

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// `expires` attribute format (RFC 1123, always GMT)
pub const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Iterate `name=value` pairs of a jar cookie string
///
/// Values keep everything after the first `=`. Pairs without `=` or with an
/// empty name are skipped rather than treated as errors.
pub fn cookie_pairs(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(';').filter_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim()))
    })
}

pub fn format_expires(at: DateTime<Utc>) -> String {
    at.format(EXPIRES_FORMAT).to_string()
}

/// Parse an `expires` attribute; accepts the `GMT` and `UTC` suffixes
pub fn parse_expires(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let without_zone = trimmed
        .strip_suffix("GMT")
        .or_else(|| trimmed.strip_suffix("UTC"))
        .unwrap_or(trimmed)
        .trim();
    NaiveDateTime::parse_from_str(without_zone, "%a, %d %b %Y %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// A cookie write, rendered as a `Set-Cookie` style string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub same_site: &'static str,
}

impl SetCookie {
    /// Root-path, lax same-site cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires,
            path: "/".to_string(),
            same_site: "Lax",
        }
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; expires={}; path={}; SameSite={}",
            self.name,
            self.value,
            format_expires(self.expires),
            self.path,
            self.same_site
        )
    }
}

/// Attributes of a parsed `Set-Cookie` style string that a jar cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSetCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
}

impl ParsedSetCookie {
    /// Whether this write deletes the cookie
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(max_age) = self.max_age {
            return max_age <= 0;
        }
        self.expires.is_some_and(|expires| expires <= now)
    }
}

pub fn parse_set_cookie(raw: &str) -> Option<ParsedSetCookie> {
    let mut parts = raw.split(';');
    let (name, value) = parts.next()?.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut parsed = ParsedSetCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        expires: None,
        max_age: None,
    };

    for attribute in parts {
        let (key, val) = attribute
            .trim()
            .split_once('=')
            .unwrap_or((attribute.trim(), ""));
        match key.trim().to_ascii_lowercase().as_str() {
            "expires" => parsed.expires = parse_expires(val),
            "max-age" => parsed.max_age = val.trim().parse().ok(),
            _ => {}
        }
    }

    Some(parsed)
}
