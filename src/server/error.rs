//! Route error type
//!
//! Every failure before the response body starts becomes HTTP 500 with a
//! JSON body `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error returned by route handlers
#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl ServerError {
    /// Message sent to the caller
    pub fn message(&self) -> String {
        self.0.to_string()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Error handling chat request");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}
