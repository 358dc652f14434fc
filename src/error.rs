//! Error types for profrag
//!
//! This module defines the error types used throughout the service,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for profrag operations
///
/// Covers configuration loading, request validation, and failures of the
/// external embedding, vector search, and generation services.
#[derive(Error, Debug)]
pub enum ProfragError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be served because of its content
    #[error("{0}")]
    Input(String),

    /// Embedding request failed (network, auth, or malformed response)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector search request failed
    #[error("Search error: {0}")]
    Search(String),

    /// Generation request failed, before or during streaming
    #[error("Generation error: {0}")]
    Generation(String),

    /// Chat client errors (non-success responses, broken transport)
    #[error("Client error: {0}")]
    Client(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for profrag operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// [`ProfragError`] stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
