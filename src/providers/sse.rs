//! Incremental server-sent events decoder
//!
//! Streaming chat completions arrive as an SSE body split into arbitrary
//! network chunks. [`SseDecoder`] buffers raw bytes between event boundaries
//! (a blank line) and yields the joined `data:` payload of every complete
//! event. Bytes are only decoded once a full event is buffered, so a chunk
//! boundary inside a multi-byte character never corrupts the payload.
//!
//! Field handling:
//!
//! - `data:` lines are joined with `\n`.
//! - `event: ping` events and empty payloads are dropped.
//! - `id:`, `retry:` and `:` comment lines are ignored.

/// Stateful SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes and return the payloads of every event it completed
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::providers::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.push(b"data: hel").is_empty());
    /// assert_eq!(decoder.push(b"lo\n\n"), vec!["hello".to_string()]);
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some((end, delimiter_len)) = find_event_boundary(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + delimiter_len).take(end).collect();
            if let Some(payload) = parse_event_block(&String::from_utf8_lossy(&block)) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let block = std::mem::take(&mut self.buffer);
        parse_event_block(&String::from_utf8_lossy(&block))
    }
}

/// Locate the first blank-line boundary, returning (event end, delimiter length)
fn find_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| (p, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Extract the data payload of a single event block
fn parse_event_block(block: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();
    let mut event_type: Option<&str> = None;

    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        }
    }

    if event_type.is_some_and(|et| et.eq_ignore_ascii_case("ping")) {
        return None;
    }

    let data = data_lines.join("\n");
    if data.is_empty() {
        return None;
    }
    Some(data)
}
