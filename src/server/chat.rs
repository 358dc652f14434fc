//! `POST /api/chat` handler
//!
//! The request body is the full conversation as a JSON array of messages.
//! On success the generated answer streams back as `text/plain` chunks.

use crate::error::ProfragError;
use crate::providers::Message;
use crate::relay::spawn_relay;
use crate::server::error::ServerError;
use crate::server::AppState;
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Content type of the streamed answer
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Handles one chat turn
///
/// The body is read as raw bytes so that malformed JSON and oversized or
/// unreadable bodies are reported like every other pre-stream failure
/// (500 with a JSON error).
pub async fn chat_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response, ServerError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat_request", request_id = %request_id);

    async move {
        let body = body.map_err(|e| {
            tracing::warn!(error = %e, "Rejected request body");
            ProfragError::Input(format!("Invalid request body: {}", e))
        })?;
        let history: Vec<Message> = serde_json::from_slice(&body)
            .map_err(|e| ProfragError::Input(format!("Invalid request body: {}", e)))?;
        tracing::info!(messages = history.len(), "Received chat request");

        let prepared = state.pipeline.prepare(&history).await?;
        tracing::info!(
            matches = prepared.matches.len(),
            prompt_len = prepared.prompt_len,
            "Streaming answer"
        );

        let stream = spawn_relay(prepared.deltas);
        let response =
            ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], Body::from_stream(stream)).into_response();
        Ok::<Response, ServerError>(response)
    }
    .instrument(span)
    .await
}
