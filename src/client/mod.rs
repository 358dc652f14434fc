//! Chat client
//!
//! Consumes the streamed answer of `POST /api/chat` and keeps the displayed
//! conversation up to date:
//!
//! - [`Utf8StreamDecoder`] turns response chunks into text, handling
//!   characters split across chunks.
//! - [`ChatSession`] holds the conversation and the turn state; text is
//!   applied through a pure reducer.
//! - [`ClientStreamConsumer`] drives a body stream into a session.
//! - [`ChatClient`] performs the HTTP request.

pub mod consumer;
pub mod decoder;
pub mod http;
pub mod session;

pub use consumer::ClientStreamConsumer;
pub use decoder::Utf8StreamDecoder;
pub use http::ChatClient;
pub use session::{ChatSession, TurnState, GREETING};
