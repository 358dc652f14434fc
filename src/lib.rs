//! profrag - retrieval-augmented professor recommendations
//!
//! This library provides a small retrieval-augmented generation service:
//! a student's question is turned into search criteria and an embedding,
//! matched against a professor review index, and answered by a language
//! model whose output is streamed back to the caller.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `intent`: Rule-based extraction of search criteria from free text
//! - `providers`: Embedding and streamed generation services (OpenAI-compatible)
//! - `search`: Vector search over the professor index (Pinecone)
//! - `prompts`: System prompt and prompt assembly
//! - `relay`: Forwarding generated text to the response body
//! - `pipeline`: Per-request orchestration
//! - `server`: The `POST /api/chat` route
//! - `client`: Streaming chat client and conversation state
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use profrag::cli::{Cli, Commands};
//! use profrag::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli {
//!         config: None,
//!         verbose: false,
//!         command: Commands::Serve { bind: None },
//!     };
//!     let config = Config::load("config/config.yaml", &cli)?;
//!     profrag::server::run(&config).await
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod intent;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod relay;
pub mod search;
pub mod server;

// Re-export commonly used types
pub use client::{ChatClient, ChatSession};
pub use config::Config;
pub use error::{ProfragError, Result};
pub use intent::{IntentParser, SearchCriteria};
pub use pipeline::RagPipeline;

#[cfg(test)]
pub mod test_utils;
