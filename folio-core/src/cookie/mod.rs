//! Cookie mirror of the session token
//!
//! The tab-local token is authoritative; this module keeps a derived cookie
//! copy for requests that bypass the client, and reconciles it on page load.

mod header;
mod jar;
mod mirror;
mod sync;

pub use header::{SetCookie, cookie_pairs, format_expires, parse_expires};
pub use jar::{CookieJar, HttpCookieJar, MemoryCookieJar};
pub use mirror::CookieMirror;
pub use sync::{CookieSync, SyncOutcome};
