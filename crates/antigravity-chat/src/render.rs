//! Renderer callbacks.
//!
//! The session never touches a presentation layer directly; the caller
//! injects a [`ChatRenderer`] and draws however it likes (terminal, HTML,
//! test recorder). Rendering is a function of the callback and the caller's
//! own state, nothing more.

use crate::error::Error;

/// Lifecycle callbacks for one chat session.
///
/// `on_chunk` receives the **full accumulated** reply text, not the delta:
/// markdown formatting of partial text has to be recomputed from the whole
/// string, so renderers must replace displayed content, never append to it.
pub trait ChatRenderer: Send {
    /// Typing indicator: `true` before the request is sent, `false` once
    /// response headers arrive or the request fails
    fn on_typing(&mut self, active: bool);

    /// The in-progress reply grew; `text` is everything received so far
    fn on_chunk(&mut self, text: &str);

    /// The reply finished and was appended to history
    fn on_complete(&mut self, text: &str);

    /// The server throttled the request (HTTP 429); no reply will follow
    fn on_rate_limited(&mut self, message: &str);

    /// The request failed or the stream reported an error; render as an
    /// inline transcript entry, the session stays usable
    fn on_error(&mut self, error: &Error);
}

#[cfg(test)]
pub(crate) mod recording {
    //! A renderer that records every callback, for session tests.

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Callback {
        Typing(bool),
        Chunk(String),
        Complete(String),
        RateLimited(String),
        Error(String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub calls: Vec<Callback>,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn chunks(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Callback::Chunk(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn completions(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Callback::Complete(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl ChatRenderer for RecordingRenderer {
        fn on_typing(&mut self, active: bool) {
            self.calls.push(Callback::Typing(active));
        }

        fn on_chunk(&mut self, text: &str) {
            self.calls.push(Callback::Chunk(text.to_string()));
        }

        fn on_complete(&mut self, text: &str) {
            self.calls.push(Callback::Complete(text.to_string()));
        }

        fn on_rate_limited(&mut self, message: &str) {
            self.calls.push(Callback::RateLimited(message.to_string()));
        }

        fn on_error(&mut self, error: &Error) {
            self.calls.push(Callback::Error(error.to_string()));
        }
    }
}
