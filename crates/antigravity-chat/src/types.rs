//! Core types for chat sessions

use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Inline error entries shown in the transcript (rate limits, failed
    /// requests). Renderers style these differently; they never leave the
    /// client.
    Error,
}

/// One transcript entry. Append-only within a session: past entries are never
/// mutated, only the in-progress assistant reply is rebuilt until finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create an inline error entry
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Error,
            content: content.into(),
        }
    }
}

/// Outbound chat request body: `{message, session_id}`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

/// Body of an HTTP 429 response: `{message?}`
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outbound speech synthesis request body: `{text}`
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
}
