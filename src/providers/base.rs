//! Base provider traits and common types for profrag
//!
//! This module defines the traits for the two external model services the
//! pipeline talks to (embedding and streaming generation), along with the
//! chat message type shared by the server, the prompt assembler, and the
//! client.

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;

/// Role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction text that frames the conversation
    System,
    /// A student's message
    User,
    /// A generated answer
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message structure for conversation
///
/// The wire format is `{"role": "user", "content": "..."}`. Content may be
/// absent on the wire, which deserializes to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::providers::{Message, Role};
    ///
    /// let msg = Message::user("Who teaches linear algebra?");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::providers::{Message, Role};
    ///
    /// let msg = Message::assistant("Here are three professors...");
    /// assert_eq!(msg.role, Role::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
        }
    }

    /// Returns the content, treating an absent content as empty text
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::providers::{Message, Role};
    ///
    /// let msg = Message { role: Role::User, content: None };
    /// assert_eq!(msg.text(), "");
    /// ```
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Asynchronous sequence of generated text deltas
///
/// Each item is one upstream event: `Ok(Some(text))` carries content,
/// `Ok(None)` is a non-content event (role announcements, finish markers),
/// and `Err(_)` is a terminal upstream failure. The end of the stream is the
/// normal end of generation.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<Option<String>>> + Send>>;

/// Text embedding service
///
/// Turns text into a fixed-dimension vector used for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single input text
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Embedding` if the request fails or the
    /// response carries no vector
    async fn embed(&self, input: &str) -> Result<Vec<f32>>;
}

/// Streaming chat generation service
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Starts a streamed completion for the given message sequence
    ///
    /// The returned future settles once the upstream service has accepted the
    /// request; deltas are then pulled from the returned stream.
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Generation` when the request is rejected before
    /// any delta is produced
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream>;
}
