//! Incremental decoder for `text/event-stream` bodies.

/// What a complete `data:` line carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    /// The `[DONE]` sentinel that ends an OpenAI-style stream
    Done,
}

/// Splits a byte stream into SSE data events. Chunks may end anywhere,
/// including inside a line or a multi-byte character.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect the events completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim_end_matches(|c| c == '\r' || c == '\n')) {
                events.push(event);
            }
        }
        events
    }
}

/// Comments, blank separators and non-data fields yield nothing
fn parse_line(line: &str) -> Option<SseEvent> {
    let data = line.strip_prefix("data:")?.trim_start();
    match data {
        "" => None,
        "[DONE]" => Some(SseEvent::Done),
        payload => Some(SseEvent::Data(payload.to_string())),
    }
}
