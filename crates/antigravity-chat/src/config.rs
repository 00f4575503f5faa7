//! Per-widget configuration.
//!
//! The dashboard shipped three near-identical chat widgets that differed only
//! in endpoint paths, greeting, and whether replies were spoken aloud. One
//! configured session type replaces all of them.

/// Configuration for one chat widget instance
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Name shown next to assistant replies
    pub display_name: String,
    /// URL the chat request is POSTed to
    pub chat_endpoint: String,
    /// URL for speech synthesis; `None` disables the speech side channel
    pub tts_endpoint: Option<String>,
    /// Prefix for generated session ids (e.g. `"public_"`)
    pub session_prefix: String,
    /// Assistant greeting seeded into an empty transcript
    pub welcome: Option<String>,
}

impl WidgetConfig {
    /// Create a configuration with speech and greeting disabled
    pub fn new(display_name: impl Into<String>, chat_endpoint: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            chat_endpoint: chat_endpoint.into(),
            tts_endpoint: None,
            session_prefix: String::new(),
            welcome: None,
        }
    }

    /// Enable the speech side channel
    pub fn with_tts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.tts_endpoint = Some(endpoint.into());
        self
    }

    /// Set the session id prefix
    pub fn with_session_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.session_prefix = prefix.into();
        self
    }

    /// Set the greeting shown when the transcript is empty
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = Some(welcome.into());
        self
    }
}
