//! Response body consumer
//!
//! Reads the streamed answer chunk by chunk, decodes it incrementally and
//! folds each fragment into the [`ChatSession`].

use crate::client::decoder::Utf8StreamDecoder;
use crate::client::session::ChatSession;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;

/// Drives one response body into a session
#[derive(Debug, Default)]
pub struct ClientStreamConsumer {
    decoder: Utf8StreamDecoder,
}

impl ClientStreamConsumer {
    /// Create a consumer with a fresh decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `body` until it ends or fails
    ///
    /// `on_fragment` sees every decoded fragment as it is applied, which
    /// lets a caller render text incrementally. A transport error moves the
    /// session to `Error` and keeps the partial answer.
    pub async fn consume<S, E, F>(
        &mut self,
        mut session: ChatSession,
        body: S,
        mut on_fragment: F,
    ) -> ChatSession
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Display,
        F: FnMut(&str),
    {
        tokio::pin!(body);
        session.start_streaming();

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    let text = self.decoder.decode(&bytes);
                    if !text.is_empty() {
                        on_fragment(&text);
                        session = session.apply_fragment(&text);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Response stream failed");
                    session = self.flush(session, &mut on_fragment);
                    session.fail(format!("stream interrupted: {}", e));
                    return session;
                }
            }
        }

        session = self.flush(session, &mut on_fragment);
        session.complete();
        session
    }

    fn flush<F: FnMut(&str)>(&mut self, session: ChatSession, on_fragment: &mut F) -> ChatSession {
        let tail = self.decoder.finish();
        if tail.is_empty() {
            return session;
        }
        on_fragment(&tail);
        session.apply_fragment(&tail)
    }
}
