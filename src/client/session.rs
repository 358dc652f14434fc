//! Client-side conversation state
//!
//! A [`ChatSession`] starts with one assistant greeting. Each turn appends
//! the user's message and an empty assistant placeholder; streamed text is
//! folded into that placeholder through [`ChatSession::apply_fragment`].
//! Messages are never removed during a session.

use crate::error::{ProfragError, Result};
use crate::providers::{Message, Role};
use std::fmt;

/// Greeting shown at the start of every session
pub const GREETING: &str = "Hi! I'm the Rate My Professor assistant. How can I help you today?";

/// Progress of the current turn
///
/// `Complete` and `Error` are terminal for a turn; [`ChatSession::finish_turn`]
/// returns the session to `Idle`, and [`ChatSession::begin_turn`] does so
/// implicitly before sending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No turn in progress
    #[default]
    Idle,
    /// Request sent, no response yet
    Sending,
    /// Response body is arriving
    Streaming,
    /// The answer finished normally
    Complete,
    /// The turn failed; partial content is kept
    Error(String),
}

impl TurnState {
    /// True while a request is outstanding
    pub fn in_progress(&self) -> bool {
        matches!(self, Self::Sending | Self::Streaming)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Sending => write!(f, "sending"),
            Self::Streaming => write!(f, "streaming"),
            Self::Complete => write!(f, "complete"),
            Self::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Ordered conversation plus the state of the current turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    messages: Vec<Message>,
    state: TurnState,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Create a session seeded with the greeting
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    /// Create a session seeded with a custom greeting
    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            state: TurnState::Idle,
        }
    }

    /// Messages in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// State of the current turn
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Content of the trailing assistant message, if any
    pub fn last_answer(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(Message::text)
    }

    /// Start a turn and return the request body
    ///
    /// Appends the user message and an empty assistant placeholder. The
    /// returned history ends with the new user message and does not include
    /// the placeholder.
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Client` if a turn is already in progress
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::client::{ChatSession, TurnState};
    ///
    /// let mut session = ChatSession::new();
    /// let body = session.begin_turn("Who teaches physics?").unwrap();
    /// assert_eq!(body.len(), 2);
    /// assert_eq!(session.messages().len(), 3);
    /// assert_eq!(session.state(), &TurnState::Sending);
    /// ```
    pub fn begin_turn(&mut self, text: &str) -> Result<Vec<Message>> {
        if self.state.in_progress() {
            return Err(ProfragError::Client(format!(
                "a turn is already in progress ({})",
                self.state
            ))
            .into());
        }

        self.finish_turn();

        self.messages.push(Message::user(text));
        let request = self.messages.clone();
        self.messages.push(Message::assistant(""));
        self.state = TurnState::Sending;
        Ok(request)
    }

    /// Fold one decoded fragment into the session
    ///
    /// Only the trailing assistant message changes. A session without a
    /// trailing assistant message is returned unchanged.
    pub fn apply_fragment(mut self, fragment: &str) -> Self {
        if fragment.is_empty() {
            return self;
        }
        if let Some(last) = self
            .messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant)
        {
            last.content
                .get_or_insert_with(String::new)
                .push_str(fragment);
        }
        if self.state == TurnState::Sending {
            self.state = TurnState::Streaming;
        }
        self
    }

    /// Mark the response body as started
    pub fn start_streaming(&mut self) {
        self.state = TurnState::Streaming;
    }

    /// Mark the turn as finished
    pub fn complete(&mut self) {
        self.state = TurnState::Complete;
    }

    /// Mark the turn as failed, keeping any partial answer
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = TurnState::Error(message.into());
    }

    /// Return a finished turn to `Idle`
    ///
    /// Yields the terminal state (`Complete` or `Error`) that was left, or
    /// `None` if the session was idle or a turn is still in progress.
    pub fn finish_turn(&mut self) -> Option<TurnState> {
        match self.state {
            TurnState::Complete | TurnState::Error(_) => {
                Some(std::mem::take(&mut self.state))
            }
            _ => None,
        }
    }

    /// Discard the conversation and start over with the greeting
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
