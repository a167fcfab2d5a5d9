//! Error types for the generation client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the generation API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not get an answer (DNS, connect, TLS, reset...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status code
    #[error("API error: {status} - {body}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// A success response did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The client was built from an unusable configuration
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a transport error from status code and body
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// HTTP status of a transport error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Transport { status, .. } if (400..500).contains(status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Transport { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_message_embeds_status_and_body() {
        let err = ClientError::transport(500, "boom");
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert_eq!(err.status(), Some(500));
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_error_range() {
        assert!(ClientError::transport(429, "slow down").is_client_error());
        assert!(ClientError::Parse("bad".into()).status().is_none());
    }
}
