//! Session credential type

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque bearer credential identifying a logged-in reader
///
/// `Debug` never prints the secret; use [`SessionToken::as_str`] where the
/// raw value is needed on the wire.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let token = SessionToken::new("tok123");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("tok123"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn bearer_header_value() {
        let token = SessionToken::from("tok123");
        assert_eq!(token.bearer(), "Bearer tok123");
    }

    #[test]
    fn serializes_transparently() {
        let token = SessionToken::from("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
        let parsed: SessionToken = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, token);
    }
}
