//! Error types for antigravity-chat

use thiserror::Error;

/// Result type alias using antigravity-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a chat session
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server rejected the request with HTTP 429
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// The outbound request failed or the server answered with a
    /// non-success, non-429 status
    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    /// An explicit `error` event arrived mid-stream
    #[error("Stream error: {message}")]
    Stream { message: String },

    /// Speech synthesis or playback failed (never surfaced as a chat error)
    #[error("Audio error: {message}")]
    Audio { message: String },
}

impl Error {
    /// Create a request failure from any displayable cause
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
        }
    }

    /// Create an audio error from any displayable cause
    pub fn audio(message: impl Into<String>) -> Self {
        Self::Audio {
            message: message.into(),
        }
    }

    /// Whether this error came from the rate limiter rather than a
    /// generic failure
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_detection() {
        let e = Error::RateLimited {
            message: "slow down".into(),
        };
        assert!(e.is_rate_limited());
        assert!(!Error::request_failed("boom").is_rate_limited());
    }

    #[test]
    fn test_display_includes_message() {
        let e = Error::Stream {
            message: "backend unavailable".into(),
        };
        assert_eq!(e.to_string(), "Stream error: backend unavailable");
    }
}
