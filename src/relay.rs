//! Streaming relay
//!
//! Forwards generated text deltas to the HTTP response as they arrive. The
//! relay runs on its own task and writes into an unbounded channel whose
//! receiving end becomes the response body. Each non-empty delta is sent as
//! one UTF-8 chunk; an upstream error sends one terminal error item and
//! stops. Nothing is buffered, reordered or retried.

use crate::providers::DeltaStream;
use bytes::Bytes;
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::Instrument;

/// Terminal error delivered to the transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Generation failed after streaming had started
    #[error("generation failed mid-stream: {0}")]
    Upstream(String),
}

/// Item carried by the relay channel
pub type RelayItem = std::result::Result<Bytes, RelayError>;

/// How a relay run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream was exhausted and every chunk was forwarded
    Completed { chunks: usize, bytes: usize },
    /// Upstream failed; the transport received an error item
    Failed { chunks: usize, error: String },
    /// The receiving side went away before upstream finished
    Disconnected { chunks: usize },
}

/// Forwards every content delta into `tx`
///
/// Returns when upstream ends, fails, or the receiver is dropped. In the
/// last case the delta stream is dropped without being read further, which
/// closes the upstream connection.
pub async fn relay(mut deltas: DeltaStream, tx: mpsc::UnboundedSender<RelayItem>) -> RelayOutcome {
    let mut chunks = 0;
    let mut bytes = 0;

    loop {
        if tx.is_closed() {
            return RelayOutcome::Disconnected { chunks };
        }

        let Some(item) = deltas.next().await else {
            return RelayOutcome::Completed { chunks, bytes };
        };

        match item {
            Ok(Some(text)) if !text.is_empty() => {
                let len = text.len();
                if tx.send(Ok(Bytes::from(text))).is_err() {
                    return RelayOutcome::Disconnected { chunks };
                }
                chunks += 1;
                bytes += len;
            }
            Ok(_) => {}
            Err(e) => {
                let error = e.to_string();
                let _ = tx.send(Err(RelayError::Upstream(error.clone())));
                return RelayOutcome::Failed { chunks, error };
            }
        }
    }
}

/// Spawns [`relay`] on a new task and returns the receiving stream
///
/// The task inherits the caller's tracing span and logs the outcome.
pub fn spawn_relay(deltas: DeltaStream) -> UnboundedReceiverStream<RelayItem> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(
        async move {
            match relay(deltas, tx).await {
                RelayOutcome::Completed { chunks, bytes } => {
                    tracing::info!(chunks, bytes, "Relay completed");
                }
                RelayOutcome::Failed { chunks, error } => {
                    tracing::error!(chunks, error = %error, "Relay aborted by upstream failure");
                }
                RelayOutcome::Disconnected { chunks } => {
                    tracing::warn!(chunks, "Client disconnected during relay");
                }
            }
        }
        .instrument(tracing::Span::current()),
    );

    UnboundedReceiverStream::new(rx)
}
