//! antigravity-chat: streamed chat session client
//!
//! This crate turns one user-submitted message into a sequence of renderer
//! callbacks by consuming the assistant backend's chunked `data: <JSON>`
//! response stream. It owns the transcript for one widget instance and,
//! when configured, reads finished replies aloud through a caller-supplied
//! audio backend.

pub mod config;
pub mod error;
pub mod markdown;
pub mod render;
pub mod session;
pub mod speech;
pub mod sse;
pub mod types;

pub use config::WidgetConfig;
pub use error::{Error, Result};
pub use render::ChatRenderer;
pub use session::{ChatSession, SessionHandle};
pub use speech::{AudioBackend, DiscardBackend, PlaybackHandle, SpeechPlayer};
pub use sse::{EventLineDecoder, StreamEvent};
pub use types::{ChatMessage, Role};
