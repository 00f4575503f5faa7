//! Audio playback via an external player process.
//!
//! The synthesized audio format is opaque to the chat client, so playback is
//! delegated to a user-configurable player command (mpv by default) that
//! reads the bytes from stdin. Stopping playback kills the player.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use antigravity_chat::{AudioBackend, Error, PlaybackHandle, Result};

/// Plays audio by piping it into an external player command
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse a whitespace-separated player command line
    pub fn new(command: &str) -> anyhow::Result<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("player command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl AudioBackend for CommandBackend {
    fn start(&self, audio: &[u8]) -> Result<Box<dyn PlaybackHandle>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::audio(format!("failed to spawn '{}': {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(audio)
                .map_err(|e| Error::audio(format!("failed to feed player: {}", e)))?;
            // Dropping stdin closes the pipe; the player keeps playing
        }

        Ok(Box::new(PlayerHandle { child }))
    }
}

struct PlayerHandle {
    child: Child,
}

impl PlaybackHandle for PlayerHandle {
    fn stop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
