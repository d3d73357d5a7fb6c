//! Error types for the directory API client.
//!
//! Transient HTTP failures are retried inside the client and only show up
//! here once the retry budget is spent.

use thiserror::Error;

/// A specialized `Result` type for directory client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all directory client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable credentials, or the token endpoint refused them
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid parameter combination or missing required input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal HTTP failure: a non-retryable status, or a retryable one
    /// after the retry budget ran out.
    #[error("API error: status={status}, reason={reason}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status code
        reason: String,
        /// Raw response body
        body: String,
    },

    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-reqwest transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A successful response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Returns the HTTP status carried by an [`Error::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a client-side issue.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 400 && *status < 500,
            Error::Config(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Error::Api {
            status,
            reason,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_auth() {
        assert!(Error::Auth("no credentials".into()).is_auth_error());
        assert!(Error::from_status(401, String::new()).is_auth_error());
        assert!(!Error::Config("bad".into()).is_auth_error());
    }

    #[test]
    fn test_from_status_reason() {
        let err = Error::from_status(503, "{\"error\":\"down\"}".to_string());
        match err {
            Error::Api {
                status,
                reason,
                body,
            } => {
                assert_eq!(status, 503);
                assert_eq!(reason, "Service Unavailable");
                assert_eq!(body, "{\"error\":\"down\"}");
            }
            _ => panic!("Expected Api error"),
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::from_status(404, String::new()).is_client_error());
        assert!(Error::from_status(502, String::new()).is_server_error());
        assert!(Error::Config("fields".into()).is_client_error());
        assert_eq!(Error::from_status(429, String::new()).status(), Some(429));
        assert_eq!(Error::Auth("x".into()).status(), None);
    }
}
