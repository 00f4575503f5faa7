//! Event-line decoding for the streamed chat response.
//!
//! The chat endpoint answers with a chunked body made of newline-delimited
//! records of the form `data: <JSON>`, a minimal subset of the SSE framing.
//! Only the `data:` field is interpreted; `event:`/`id:`/`retry:` lines,
//! blank keep-alives, and anything else are ignored.
//!
//! Network chunks can split a record anywhere, including in the middle of a
//! multi-byte UTF-8 sequence, so the decoder buffers raw bytes and only
//! decodes complete lines. Reassembly is therefore invariant under how the
//! transport chose to split the body.

use serde::Deserialize;

/// One decoded event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text delta for the in-progress assistant reply
    Chunk { text: String },
    /// The reply is complete
    Done,
    /// The server reported an error mid-stream
    Error { message: String },
}

/// Wire shape of a `data:` payload. The server emits exactly one of the
/// three fields per line.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// Literal prefix of an interpreted event line
const DATA_PREFIX: &str = "data: ";

/// Stateful decoder turning raw body chunks into [`StreamEvent`]s.
///
/// Feed it every chunk in arrival order, then call [`finish`](Self::finish)
/// once the stream ends to flush a trailing unterminated line.
#[derive(Debug, Default)]
pub struct EventLineDecoder {
    /// Bytes of the trailing incomplete line, carried between chunks
    buf: Vec<u8>,
}

impl EventLineDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one body chunk, returning the events completed by it.
    ///
    /// Event order matches the order of lines in the byte stream.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            // Drop the newline; parse_line strips an optional \r
            if let Some(event) = parse_line(&line[..line.len() - 1]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the trailing line once the stream has ended.
    ///
    /// Servers normally terminate every record with a newline, but a final
    /// record without one would otherwise be lost silently.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buf.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buf);
        parse_line(&line)
    }
}

/// Parse one complete line (without its trailing newline).
///
/// Returns `None` for anything that is not a well-formed `data:` record:
/// non-`data:` lines, invalid UTF-8, malformed JSON, or JSON carrying none
/// of the known fields. None of these abort the stream.
fn parse_line(raw: &[u8]) -> Option<StreamEvent> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(_) => {
            tracing::debug!("dropping event line with invalid UTF-8");
            return None;
        }
    };
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    let event: RawEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("dropping malformed event line: {}", e);
            return None;
        }
    };

    if let Some(text) = event.chunk {
        Some(StreamEvent::Chunk { text })
    } else if event.done.unwrap_or(false) {
        Some(StreamEvent::Done)
    } else {
        event
            .error
            .map(|message| StreamEvent::Error { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the full input through the decoder split at the given chunk sizes
    fn decode_split(input: &[u8], chunks: &[&[u8]]) -> Vec<StreamEvent> {
        assert_eq!(chunks.concat(), input);
        let mut decoder = EventLineDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_single_chunk_line() {
        let mut decoder = EventLineDecoder::new();
        let events = decoder.feed(b"data: {\"chunk\":\"hello\"}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Chunk {
                text: "hello".into()
            }]
        );
    }

    #[test]
    fn test_done_and_error_lines() {
        let mut decoder = EventLineDecoder::new();
        let events =
            decoder.feed(b"data: {\"done\":true}\ndata: {\"error\":\"backend down\"}\n");
        assert_eq!(
            events,
            vec![
                StreamEvent::Done,
                StreamEvent::Error {
                    message: "backend down".into()
                }
            ]
        );
    }

    #[test]
    fn test_done_false_is_ignored() {
        let mut decoder = EventLineDecoder::new();
        assert!(decoder.feed(b"data: {\"done\":false}\n").is_empty());
    }

    #[test]
    fn test_line_split_across_chunks() {
        let input = b"data: {\"chunk\":\"hello world\"}\n";
        let whole = decode_split(input, &[input]);
        // Split in the middle of the prefix and in the middle of the JSON
        let split = decode_split(input, &[b"dat", b"a: {\"chu", b"nk\":\"hello world\"}\n"]);
        assert_eq!(whole, split);
    }

    #[test]
    fn test_every_split_point_is_equivalent() {
        let input: &[u8] =
            b"data: {\"chunk\":\"Hello \"}\ndata: {\"chunk\":\"world\"}\ndata: {\"done\":true}\n";
        let expected = decode_split(input, &[input]);
        for i in 0..=input.len() {
            let (a, b) = input.split_at(i);
            assert_eq!(decode_split(input, &[a, b]), expected, "split at {}", i);
        }
    }

    #[test]
    fn test_multibyte_char_split_at_chunk_boundary() {
        // "héllo" — the é is two bytes; split between them
        let input = "data: {\"chunk\":\"héllo\"}\n".as_bytes();
        let boundary = input.iter().position(|&b| b == 0xc3).unwrap() + 1;
        let (a, b) = input.split_at(boundary);
        let events = decode_split(input, &[a, b]);
        assert_eq!(
            events,
            vec![StreamEvent::Chunk {
                text: "héllo".into()
            }]
        );
    }

    #[test]
    fn test_emoji_split_at_every_byte() {
        let input = "data: {\"chunk\":\"🚀\"}\n".as_bytes();
        for i in 0..=input.len() {
            let (a, b) = input.split_at(i);
            assert_eq!(
                decode_split(input, &[a, b]),
                vec![StreamEvent::Chunk { text: "🚀".into() }],
                "split at {}",
                i
            );
        }
    }

    #[test]
    fn test_malformed_json_does_not_interrupt() {
        let input: &[u8] =
            b"data: {\"chunk\":\"a\"}\ndata: not-json\ndata: {\"chunk\":\"b\"}\n";
        let events = decode_split(input, &[input]);
        assert_eq!(
            events,
            vec![
                StreamEvent::Chunk { text: "a".into() },
                StreamEvent::Chunk { text: "b".into() }
            ]
        );
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let input: &[u8] = b"event: message\nid: 3\n\n: keep-alive\ndata: {\"done\":true}\n";
        assert_eq!(decode_split(input, &[input]), vec![StreamEvent::Done]);
    }

    #[test]
    fn test_crlf_lines() {
        let mut decoder = EventLineDecoder::new();
        let events = decoder.feed(b"data: {\"chunk\":\"hi\"}\r\n");
        assert_eq!(events, vec![StreamEvent::Chunk { text: "hi".into() }]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut decoder = EventLineDecoder::new();
        assert!(decoder.feed(b"data: {\"usage\":{\"tokens\":3}}\n").is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = EventLineDecoder::new();
        assert!(decoder.feed(b"data: {\"done\":true}").is_empty());
        assert_eq!(decoder.finish(), Some(StreamEvent::Done));
        // Idempotent once drained
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_finish_on_partial_garbage() {
        let mut decoder = EventLineDecoder::new();
        decoder.feed(b"data: {\"chunk\":");
        assert_eq!(decoder.finish(), None);
    }
}
