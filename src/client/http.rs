//! HTTP client for the chat route
//!
//! Sends the session history to `POST /api/chat` and streams the answer
//! into the session.

use crate::client::consumer::ClientStreamConsumer;
use crate::client::session::ChatSession;
use crate::error::{ProfragError, Result};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Chat route client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    /// Create a client for the given chat route URL
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(endpoint: &str) -> Result<Self> {
        url::Url::parse(endpoint).map_err(|e| {
            ProfragError::Config(format!("invalid chat endpoint {}: {}", endpoint, e))
        })?;

        let client = Client::builder()
            .user_agent(concat!("profrag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProfragError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one turn
    ///
    /// Appends `text` and an assistant placeholder to the session, posts the
    /// history and streams the answer into the placeholder, calling
    /// `on_fragment` with each decoded fragment. Transport failures and
    /// non-success responses are recorded in the returned session's
    /// [`TurnState`](crate::client::TurnState) rather than returned as
    /// errors; a pre-stream error body is never appended to the answer.
    ///
    /// # Errors
    ///
    /// Returns error only if a turn is already in progress
    pub async fn send_turn<F>(
        &self,
        mut session: ChatSession,
        text: &str,
        on_fragment: F,
    ) -> Result<ChatSession>
    where
        F: FnMut(&str),
    {
        let history = session.begin_turn(text)?;
        tracing::debug!(messages = history.len(), endpoint = %self.endpoint, "Sending chat turn");

        let response = match self.client.post(&self.endpoint).json(&history).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                session.fail(format!("request failed: {}", e));
                return Ok(session);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("server returned {}", status));
            tracing::warn!(%status, error = %message, "Chat request rejected");
            session.fail(message);
            return Ok(session);
        }

        let session = ClientStreamConsumer::new()
            .consume(session, response.bytes_stream(), on_fragment)
            .await;
        Ok(session)
    }
}
