//! Reader API errors

use thiserror::Error;

use crate::error::ConfigError;

/// Errors from HTTP calls to the reader server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),

    /// The server rejected the credential; callers treat this as a forced logout
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_status_and_body() {
        let error = ApiError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Server returned 500: boom");
    }

    #[test]
    fn unauthorized_is_flagged() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::Request("timeout".to_string()).is_unauthorized());
    }

    #[test]
    fn config_error_converts() {
        let error: ApiError = ConfigError::InvalidPath("x".to_string()).into();
        assert!(matches!(error, ApiError::Config(_)));
    }
}
