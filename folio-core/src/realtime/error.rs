//! Realtime transport errors

use thiserror::Error;

/// Why a server-push connection could not be opened or ended
///
/// These never reach channel callers; the channel logs them and reconnects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Server returned status {status}")]
    Status { status: u16 },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Stream closed by server")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code() {
        let error = TransportError::Status { status: 401 };
        assert_eq!(error.to_string(), "Server returned status 401");
    }

    #[test]
    fn closed_displays_correctly() {
        assert!(TransportError::Closed.to_string().contains("closed"));
    }
}
