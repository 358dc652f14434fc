//! Incremental UTF-8 decoding
//!
//! Response chunks may end in the middle of a multi-byte character. The
//! decoder keeps the incomplete tail and prepends it to the next chunk, so a
//! character split across reads decodes once both parts have arrived.
//! Invalid sequences become U+FFFD.

/// Stateful UTF-8 decoder for a chunked byte stream
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk
    ///
    /// Returns all text that is complete so far. An incomplete sequence at
    /// the end of the chunk is held back until the next call.
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::client::Utf8StreamDecoder;
    ///
    /// let bytes = "caf\u{e9}".as_bytes();
    /// let mut decoder = Utf8StreamDecoder::new();
    /// assert_eq!(decoder.decode(&bytes[..4]), "caf");
    /// assert_eq!(decoder.decode(&bytes[4..]), "\u{e9}");
    /// ```
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut text = String::new();
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        text
    }

    /// Flush the decoder at end of stream
    ///
    /// A dangling partial sequence is emitted as a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}
