//! OpenAI-compatible provider implementation
//!
//! Implements both [`Embedder`] (`POST {api_base}/embeddings`) and
//! [`ChatModel`] (`POST {api_base}/chat/completions` with `stream: true`).
//! Streamed completions are read as server-sent events and turned into a
//! [`DeltaStream`] of content deltas.

use crate::config::OpenAiConfig;
use crate::error::{ProfragError, Result};
use crate::providers::base::{ChatModel, DeltaStream, Embedder, Message};
use crate::providers::sse::SseDecoder;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

const DONE_MARKER: &str = "[DONE]";

/// OpenAI-compatible embedding and chat provider
///
/// Holds a single `reqwest::Client`; the client's connection pool is shared
/// by every request.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

/// Request body for `/embeddings`
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

/// Response body from `/embeddings`
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// One streamed completion event
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: String,
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Read state of a streamed completion
struct DeltaReader {
    bytes: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI configuration (base URL, models, key, timeout)
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::config::OpenAiConfig;
    /// use profrag::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::new(OpenAiConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("profrag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProfragError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, embedding_model={}, chat_model={}",
            config.api_base,
            config.embedding_model,
            config.chat_model
        );

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(self.endpoint(path));
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input,
            encoding_format: "float",
        };

        tracing::debug!(
            model = %self.config.embedding_model,
            input_len = input.len(),
            "Sending embedding request"
        );

        let response = self
            .post("embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Embedding request failed: {}", e);
                ProfragError::Embedding(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Embedding service returned {}: {}", status, error_text);
            return Err(ProfragError::Embedding(format!(
                "service returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            ProfragError::Embedding(format!("failed to parse response: {}", e))
        })?;

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProfragError::Embedding("response contained no vector".to_string()))?;

        tracing::debug!(dimensions = vector.len(), "Received embedding");
        Ok(vector)
    }
}

#[async_trait]
impl ChatModel for OpenAiProvider {
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            stream: true,
        };

        tracing::debug!(
            model = %self.config.chat_model,
            messages = messages.len(),
            "Sending streamed chat request"
        );

        let response = self
            .post("chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                ProfragError::Generation(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Generation service returned {}: {}", status, error_text);
            return Err(ProfragError::Generation(format!(
                "service returned {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(delta_stream(Box::pin(response.bytes_stream())))
    }
}

/// Turns an SSE byte stream into content deltas
///
/// The stream ends at `[DONE]` or at the end of the body. A transport error,
/// an unparseable event or an `error` event yields one `Err` item and ends
/// the stream.
fn delta_stream(bytes: ByteStream) -> DeltaStream {
    let reader = DeltaReader {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(payload) = reader.pending.pop_front() {
                if payload.trim() == DONE_MARKER {
                    return None;
                }
                let item = parse_delta(&payload);
                if item.is_err() {
                    reader.pending.clear();
                    reader.finished = true;
                }
                return Some((item, reader));
            }

            if reader.finished {
                return None;
            }

            match reader.bytes.next().await {
                Some(Ok(chunk)) => {
                    let payloads = reader.decoder.push(&chunk);
                    reader.pending.extend(payloads);
                }
                Some(Err(e)) => {
                    tracing::warn!("Generation stream interrupted: {}", e);
                    reader.finished = true;
                    let err = ProfragError::Generation(format!("stream interrupted: {}", e));
                    return Some((Err(err.into()), reader));
                }
                None => {
                    reader.finished = true;
                    if let Some(payload) = reader.decoder.finish() {
                        reader.pending.push_back(payload);
                    }
                }
            }
        }
    }))
}

/// Extracts the content delta from one event payload
fn parse_delta(payload: &str) -> Result<Option<String>> {
    let chunk: ChatChunk = serde_json::from_str(payload).map_err(|e| {
        ProfragError::Generation(format!("malformed stream event: {}", e))
    })?;

    if let Some(error) = chunk.error {
        return Err(ProfragError::Generation(format!("upstream error: {}", error.message)).into());
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|c| !c.is_empty()))
}
