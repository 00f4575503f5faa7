//! Streamed chat session.
//!
//! One [`ChatSession`] per widget instance. It owns the transcript, issues
//! the outbound chat request, incrementally decodes the streamed body into
//! events, and reports progress through the caller's [`ChatRenderer`].
//!
//! # Single flight
//!
//! Nothing here stops a caller from starting a second `send` while the first
//! is still streaming; the two pending replies would interleave and corrupt
//! the rendered output. Disabling the send affordance while a request is in
//! flight is a caller precondition.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::{Stream, StreamExt};
use parking_lot::Mutex;

use crate::config::WidgetConfig;
use crate::error::Error;
use crate::render::ChatRenderer;
use crate::speech::{AudioBackend, SpeechPlayer};
use crate::sse::{EventLineDecoder, StreamEvent};
use crate::types::{ChatMessage, ChatRequest, RateLimitBody};

/// Shown when the request fails or the server answers with an unexpected status
const GENERIC_FAILURE_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Shown for an HTTP 429 whose body carries no message of its own
const DEFAULT_RATE_LIMIT_TEXT: &str = "Rate limit exceeded. Please try again later.";

/// One widget instance's conversation with the assistant.
///
/// Lives for the widget lifetime; the transcript is in-memory only and is
/// discarded when the session is closed. Every terminal error leaves the
/// session reusable for the next `send`.
pub struct ChatSession {
    config: WidgetConfig,
    client: reqwest::Client,
    session_id: String,
    history: Arc<Mutex<Vec<ChatMessage>>>,
    alive: Arc<AtomicBool>,
    speech: Option<SpeechPlayer>,
}

impl ChatSession {
    /// Create a session. The session id is fixed for the session lifetime:
    /// the configured prefix plus a millisecond timestamp.
    pub fn new(config: WidgetConfig) -> Self {
        let session_id = format!(
            "{}{}",
            config.session_prefix,
            chrono::Utc::now().timestamp_millis()
        );
        Self {
            config,
            client: reqwest::Client::new(),
            session_id,
            history: Arc::new(Mutex::new(Vec::new())),
            alive: Arc::new(AtomicBool::new(true)),
            speech: None,
        }
    }

    /// Attach an audio backend. Enables the speech side channel if the
    /// configuration carries a TTS endpoint; otherwise the backend is unused.
    pub fn with_audio_backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        if let Some(ref endpoint) = self.config.tts_endpoint {
            self.speech = Some(SpeechPlayer::new(endpoint.clone(), backend));
        }
        self
    }

    /// The session id sent with every chat request
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The configuration this session was built with
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Snapshot of the transcript
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().clone()
    }

    /// A cloneable handle for tearing the session down from outside
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            alive: Arc::clone(&self.alive),
            history: Arc::clone(&self.history),
        }
    }

    /// Seed the configured greeting into an empty transcript.
    ///
    /// Returns the greeting for rendering, or `None` when no greeting is
    /// configured or the transcript already has entries.
    pub fn greet(&self) -> Option<ChatMessage> {
        let welcome = self.config.welcome.as_ref()?;
        let mut history = self.history.lock();
        if !history.is_empty() {
            return None;
        }
        let message = ChatMessage::assistant(welcome.clone());
        history.push(message.clone());
        Some(message)
    }

    /// Send one user message and stream the reply through `renderer`.
    ///
    /// A message that is empty after trimming is a silent no-op. Errors are
    /// reported through `on_error`/`on_rate_limited`, never returned: every
    /// failure is terminal for this call only.
    pub async fn send<R: ChatRenderer + ?Sized>(&self, text: &str, renderer: &mut R) {
        let message = text.trim();
        if message.is_empty() || !self.is_alive() {
            return;
        }

        self.history.lock().push(ChatMessage::user(message));
        self.emit(renderer, |r| r.on_typing(true));

        let result = self
            .client
            .post(&self.config.chat_endpoint)
            .json(&ChatRequest {
                message,
                session_id: &self.session_id,
            })
            .send()
            .await;
        self.emit(renderer, |r| r.on_typing(false));

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("chat request failed: {}", e);
                self.emit(renderer, |r| {
                    r.on_error(&Error::request_failed(GENERIC_FAILURE_TEXT));
                });
                return;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let message = response
                .json::<RateLimitBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| DEFAULT_RATE_LIMIT_TEXT.to_string());
            self.emit(renderer, |r| r.on_rate_limited(&message));
            return;
        }
        if !status.is_success() {
            tracing::debug!("chat endpoint returned {}", status);
            self.emit(renderer, |r| {
                r.on_error(&Error::request_failed(GENERIC_FAILURE_TEXT));
            });
            return;
        }

        self.consume_stream(response.bytes_stream(), renderer).await;
    }

    /// Decode the response body chunk by chunk and apply each event.
    ///
    /// Generic over the byte stream so tests can feed chunks split at
    /// arbitrary offsets.
    async fn consume_stream<S, B, E, R>(&self, stream: S, renderer: &mut R)
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
        R: ChatRenderer + ?Sized,
    {
        futures::pin_mut!(stream);
        let mut decoder = EventLineDecoder::new();
        let mut pending: Option<String> = None;

        while let Some(next) = stream.next().await {
            match next {
                Ok(bytes) => {
                    for event in decoder.feed(bytes.as_ref()) {
                        self.apply_event(event, &mut pending, renderer).await;
                    }
                }
                Err(e) => {
                    tracing::debug!("stream read failed: {}", e);
                    self.emit(renderer, |r| {
                        r.on_error(&Error::request_failed(GENERIC_FAILURE_TEXT));
                    });
                    return;
                }
            }
        }

        // A final record without a trailing newline is still delivered
        if let Some(event) = decoder.finish() {
            self.apply_event(event, &mut pending, renderer).await;
        }
    }

    async fn apply_event<R: ChatRenderer + ?Sized>(
        &self,
        event: StreamEvent,
        pending: &mut Option<String>,
        renderer: &mut R,
    ) {
        match event {
            StreamEvent::Chunk { text } => {
                let buffer = pending.get_or_insert_with(String::new);
                buffer.push_str(&text);
                let snapshot = buffer.as_str();
                self.emit(renderer, |r| r.on_chunk(snapshot));
            }
            StreamEvent::Done => {
                let Some(text) = pending.take() else {
                    tracing::debug!("done event with no pending reply");
                    return;
                };
                if !self.is_alive() {
                    return;
                }
                self.history.lock().push(ChatMessage::assistant(text.clone()));
                self.emit(renderer, |r| r.on_complete(&text));
                if let Some(ref speech) = self.speech {
                    speech.speak(&text).await;
                }
            }
            StreamEvent::Error { message } => {
                // The partial reply is never promoted to history
                *pending = None;
                self.emit(renderer, |r| r.on_error(&Error::Stream { message }));
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Invoke a renderer callback unless the session has been torn down.
    /// Callbacks from a request abandoned by `close` are dropped here.
    fn emit<R: ChatRenderer + ?Sized>(&self, renderer: &mut R, f: impl FnOnce(&mut R)) {
        if self.is_alive() {
            f(renderer);
        }
    }
}

/// A cloneable handle for closing the session from external code.
///
/// Closing does not abort an in-flight request; the request is abandoned and
/// its remaining callbacks and history writes are discarded.
#[derive(Clone)]
pub struct SessionHandle {
    alive: Arc<AtomicBool>,
    history: Arc<Mutex<Vec<ChatMessage>>>,
}

impl SessionHandle {
    /// Tear the session down and clear the transcript
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
        self.history.lock().clear();
    }

    /// Whether the session is still accepting sends and callbacks
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}
