//! Error types for tobe-session

use thiserror::Error;

/// Result type alias using tobe-session Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a session
#[derive(Error, Debug)]
pub enum Error {
    /// A negative token increment was requested
    #[error("Invalid usage: cannot record {amount} tokens")]
    InvalidUsage { amount: i64 },

    /// The completion call failed; the turn was abandoned
    #[error("Completion failed: {0}")]
    CompletionFailed(#[source] tobe_ai::Error),

    /// The summarization call failed; the conversation stays uncompacted
    #[error("Summarization failed: {0}")]
    SummarizationFailed(#[source] tobe_ai::Error),

    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input port failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the session is still usable after this error.
    ///
    /// Remote failures leave the conversation intact, so the caller can keep
    /// going with the next turn.
    pub fn is_turn_failure(&self) -> bool {
        matches!(
            self,
            Error::CompletionFailed(_) | Error::SummarizationFailed(_)
        )
    }

    /// The provider error behind a remote failure, if any
    pub fn provider_error(&self) -> Option<&tobe_ai::Error> {
        match self {
            Error::CompletionFailed(e) | Error::SummarizationFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_failures() {
        assert!(Error::CompletionFailed(tobe_ai::Error::InvalidApiKey).is_turn_failure());
        assert!(Error::SummarizationFailed(tobe_ai::Error::api("server_error", "down")).is_turn_failure());
        assert!(!Error::InvalidUsage { amount: -5 }.is_turn_failure());
        assert!(!Error::InvalidConfig("zero ceiling".into()).is_turn_failure());
    }

    #[test]
    fn test_provider_error() {
        let e = Error::CompletionFailed(tobe_ai::Error::InvalidApiKey);
        assert!(e.provider_error().is_some_and(|p| p.is_auth()));
        assert!(Error::InvalidUsage { amount: -1 }.provider_error().is_none());
    }

    #[test]
    fn test_display() {
        let e = Error::InvalidUsage { amount: -5 };
        assert_eq!(e.to_string(), "Invalid usage: cannot record -5 tokens");
    }
}
