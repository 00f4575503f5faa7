//! Speech synthesis side channel.
//!
//! Two of the original widgets read every finished reply aloud. The reply
//! text is POSTed to a TTS endpoint and the raw audio bytes handed to a
//! caller-supplied backend; decode and output live behind [`AudioBackend`]
//! because platform audio is not this crate's business.
//!
//! Speech is best-effort. Failures are logged and swallowed, never shown to
//! the user as chat errors.

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::types::SpeechRequest;

/// A handle to one in-flight playback
pub trait PlaybackHandle: Send {
    /// Stop playback. Must be safe to call after playback already ended.
    fn stop(&mut self);
}

/// Starts playback of raw audio bytes (format opaque to this crate)
pub trait AudioBackend: Send + Sync {
    fn start(&self, audio: &[u8]) -> Result<Box<dyn PlaybackHandle>>;
}

/// Backend that drops the audio on the floor
pub struct DiscardBackend;

impl AudioBackend for DiscardBackend {
    fn start(&self, _audio: &[u8]) -> Result<Box<dyn PlaybackHandle>> {
        Ok(Box::new(DiscardHandle))
    }
}

struct DiscardHandle;

impl PlaybackHandle for DiscardHandle {
    fn stop(&mut self) {}
}

/// Fetches synthesized speech and plays it, one playback at a time.
///
/// Starting a new playback always stops the previous one first. All access
/// is single-threaded per session, so holding the current handle behind a
/// mutex and swapping it is enough.
pub struct SpeechPlayer {
    client: reqwest::Client,
    endpoint: String,
    backend: Box<dyn AudioBackend>,
    current: Mutex<Option<Box<dyn PlaybackHandle>>>,
}

impl SpeechPlayer {
    /// Create a player for the given TTS endpoint
    pub fn new(endpoint: impl Into<String>, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            backend,
            current: Mutex::new(None),
        }
    }

    /// Synthesize and play `text`, logging any failure
    pub async fn speak(&self, text: &str) {
        if let Err(e) = self.try_speak(text).await {
            tracing::warn!("speech synthesis failed: {}", e);
        }
    }

    async fn try_speak(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SpeechRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::audio(format!(
                "TTS endpoint returned {}",
                response.status()
            )));
        }

        let audio = response.bytes().await?;
        self.play(&audio)
    }

    /// Play raw audio bytes, stopping any active playback first
    pub fn play(&self, audio: &[u8]) -> Result<()> {
        let mut current = self.current.lock();
        if let Some(mut previous) = current.take() {
            previous.stop();
        }
        *current = Some(self.backend.start(audio)?);
        Ok(())
    }

    /// Stop the active playback, if any
    pub fn stop(&self) {
        if let Some(mut handle) = self.current.lock().take() {
            handle.stop();
        }
    }
}
