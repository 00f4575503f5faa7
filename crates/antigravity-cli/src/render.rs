//! Terminal renderer for a chat session.
//!
//! `on_chunk` delivers the full accumulated reply, so the renderer tracks
//! how many bytes it has already written and prints only the new suffix.

use std::io::Write;

use antigravity_chat::{ChatRenderer, Error};

pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    name: String,
    /// Bytes of the in-progress reply already written
    printed: usize,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, name: impl Into<String>) -> Self {
        Self {
            out,
            name: name.into(),
            printed: 0,
        }
    }

    /// Print a finished assistant message (e.g. the greeting)
    pub fn print_assistant(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}: {}", self.name, text);
        let _ = self.out.flush();
    }

    fn end_line_if_mid_reply(&mut self) {
        if self.printed > 0 {
            let _ = writeln!(self.out);
            self.printed = 0;
        }
    }
}

impl<W: Write + Send> ChatRenderer for TerminalRenderer<W> {
    fn on_typing(&mut self, active: bool) {
        if active {
            // A truncated stream ends a reply without on_complete/on_error,
            // so the offset must restart with the send, not the reply
            self.end_line_if_mid_reply();
            let _ = write!(self.out, "…");
        } else {
            // Erase the indicator; reply or error output follows
            let _ = write!(self.out, "\r \r");
        }
        let _ = self.out.flush();
    }

    fn on_chunk(&mut self, text: &str) {
        if self.printed == 0 {
            let _ = write!(self.out, "{}: ", self.name);
        }
        // The accumulated text only ever grows, so the already-printed part
        // is a prefix and the boundary lies on a char boundary
        let _ = write!(self.out, "{}", &text[self.printed..]);
        let _ = self.out.flush();
        self.printed = text.len();
    }

    fn on_complete(&mut self, _text: &str) {
        self.end_line_if_mid_reply();
        let _ = self.out.flush();
    }

    fn on_rate_limited(&mut self, message: &str) {
        self.end_line_if_mid_reply();
        let _ = writeln!(self.out, "[rate limited] {}", message);
        let _ = self.out.flush();
    }

    fn on_error(&mut self, error: &Error) {
        self.end_line_if_mid_reply();
        let _ = writeln!(self.out, "[error] {}", error);
        let _ = self.out.flush();
    }
}
