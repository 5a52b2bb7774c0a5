//! Error types for tobe-ai

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using tobe-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a provider
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (type: {error_type})")]
    Api { error_type: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// OpenAI-style error envelope: `{"error": {"type": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: String,
}

impl Error {
    /// Create an API error from type and message
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Map a non-success HTTP response to an error.
    ///
    /// `retry_after` is the parsed `Retry-After` header, if any.
    pub fn from_status(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

        match status {
            401 | 403 => Self::Auth(
                envelope
                    .map(|e| e.error.message)
                    .unwrap_or_else(|| body.to_string()),
            ),
            429 => Self::RateLimited { retry_after },
            _ => match envelope {
                Some(e) => Self::api(
                    e.error
                        .error_type
                        .unwrap_or_else(|| format!("http_{}", status)),
                    e.error.message,
                ),
                None => Self::api(format!("http_{}", status), body),
            },
        }
    }

    /// Whether this error means the credentials are unusable
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::InvalidApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_parses_envelope() {
        let body = r#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#;
        match Error::from_status(404, body, None) {
            Error::Api {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "invalid_request_error");
                assert_eq!(message, "model not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_envelope_without_type() {
        let body = r#"{"error": {"message": "boom"}}"#;
        match Error::from_status(500, body, None) {
            Error::Api { error_type, .. } => assert_eq!(error_type, "http_500"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_plain_body() {
        match Error::from_status(502, "bad gateway", None) {
            Error::Api {
                error_type,
                message,
            } => {
                assert_eq!(error_type, "http_502");
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_unauthorized() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let e = Error::from_status(401, body, None);
        assert!(e.is_auth());
        assert!(e.to_string().contains("Incorrect API key"));
    }

    #[test]
    fn test_from_status_rate_limited() {
        let e = Error::from_status(429, "{}", Some(20));
        assert!(matches!(e, Error::RateLimited { retry_after: Some(20) }));
        assert!(!e.is_auth());
    }

    #[test]
    fn test_is_auth() {
        assert!(Error::InvalidApiKey.is_auth());
        assert!(!Error::api("server_error", "oops").is_auth());
    }
}
