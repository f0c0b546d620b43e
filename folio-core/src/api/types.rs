//! Wire types for the reader server

use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Book looked up when the caller does not name one
pub const DEFAULT_BOOK_ID: &str = "alice-in-wonderland";

/// Shown when a user record carries neither a name nor an email
pub const FALLBACK_DISPLAY_NAME: &str = "Reader";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// The signed-in user as returned by `/auth/v1/user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<UserMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserRecord {
    /// Name for the identity panel
    ///
    /// Metadata names win over top-level ones when the metadata object is
    /// present. Falls back to the email's local part, then to "Reader".
    pub fn display_name(&self) -> String {
        let (first, last) = match &self.user_metadata {
            Some(meta) => (meta.first_name.as_deref(), meta.last_name.as_deref()),
            None => (self.first_name.as_deref(), self.last_name.as_deref()),
        };
        let first = first.filter(|s| !s.is_empty());
        let last = last.filter(|s| !s.is_empty());

        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            _ => self
                .email
                .as_deref()
                .filter(|email| !email.is_empty())
                .and_then(|email| email.split('@').next())
                .map(str::to_string)
                .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/v1/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub user: UserRecord,
}

/// Body of the definition lookup call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionRequest {
    pub term: String,
    pub book_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

impl DefinitionRequest {
    /// Trims `term` and defaults an empty book to [`DEFAULT_BOOK_ID`]
    pub fn new(term: &str, book_id: Option<&str>, section_id: Option<&str>) -> Result<Self, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ApiError::InvalidInput("term must not be empty".to_string()));
        }
        let book_id = book_id
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BOOK_ID);
        Ok(Self {
            term: term.to_string(),
            book_id: book_id.to_string(),
            section_id: section_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
    /// `glossary`, `cache` or `external`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Usage example, when the glossary has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(json: &str) -> UserRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn display_name_first_only_from_metadata() {
        assert_eq!(user(r#"{"user_metadata":{"first_name":"Alice"}}"#).display_name(), "Alice");
    }

    #[test]
    fn display_name_email_local_part() {
        assert_eq!(user(r#"{"email":"alice@example.com"}"#).display_name(), "alice");
    }

    #[test]
    fn display_name_fallback() {
        assert_eq!(user("{}").display_name(), "Reader");
    }

    #[test]
    fn display_name_full_name() {
        let record = user(
            r#"{"id":"u1","email":"a@b.c","user_metadata":{"first_name":"Alice","last_name":"Liddell"}}"#,
        );
        assert_eq!(record.display_name(), "Alice Liddell");
    }

    #[test]
    fn display_name_top_level_fields() {
        let record = user(r#"{"first_name":"Mad","last_name":"Hatter"}"#);
        assert_eq!(record.display_name(), "Mad Hatter");
    }

    #[test]
    fn metadata_object_wins_even_when_empty() {
        let record = user(r#"{"user_metadata":{},"first_name":"Mad","email":"hatter@tea.party"}"#);
        assert_eq!(record.display_name(), "hatter");
    }

    #[test]
    fn empty_names_are_ignored() {
        let record = user(r#"{"user_metadata":{"first_name":"","last_name":"Liddell"}}"#);
        assert_eq!(record.display_name(), "Reader");
    }

    #[test]
    fn login_response_decodes_server_shape() {
        let json = r#"{
            "access_token":"tok123","token_type":"bearer","expires_in":86400,"expires_at":1792000000,
            "user":{"id":"u1","email":"alice@example.com","aud":"authenticated","role":"authenticated",
                    "user_metadata":{"first_name":"Alice","last_name":"Liddell"}}
        }"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok123");
        assert_eq!(response.user.display_name(), "Alice Liddell");
    }

    #[test]
    fn definition_request_defaults_book() {
        let request = DefinitionRequest::new(" rabbit ", Some(""), None).unwrap();
        assert_eq!(request.term, "rabbit");
        assert_eq!(request.book_id, DEFAULT_BOOK_ID);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("section_id").is_none());
    }

    #[test]
    fn definition_decodes_optional_example() {
        let with: Definition = serde_json::from_str(
            r#"{"term":"Rabbit","definition":"A small mammal","source":"glossary","example":"The White Rabbit ran by."}"#,
        )
        .unwrap();
        assert_eq!(with.example.as_deref(), Some("The White Rabbit ran by."));

        let without: Definition =
            serde_json::from_str(r#"{"term":"grin","definition":"Word not found in dictionary."}"#)
                .unwrap();
        assert_eq!(without.source, None);
        assert_eq!(without.example, None);
    }

    #[test]
    fn definition_request_rejects_empty_term() {
        assert!(matches!(
            DefinitionRequest::new("  ", None, None),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn definition_with_source() {
        let definition: Definition = serde_json::from_str(
            r#"{"term":"rabbit","definition":"A small mammal","source":"glossary"}"#,
        )
        .unwrap();
        assert_eq!(definition.source.as_deref(), Some("glossary"));
    }
}
