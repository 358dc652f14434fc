//! Configuration management for profrag
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ProfragError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for profrag
///
/// Holds the server, external service, client, and logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// OpenAI-compatible embedding and generation service
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Pinecone vector index
    #[serde(default)]
    pub pinecone: PineconeConfig,
    /// Terminal chat client settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL; `/embeddings` and `/chat/completions` are appended
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model used for query embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model used for streamed answers
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Per-request timeout (seconds), covering the whole streamed response
    #[serde(default = "default_openai_timeout")]
    pub timeout_seconds: u64,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_timeout() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            api_key: None,
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            timeout_seconds: default_openai_timeout(),
        }
    }
}

/// Pinecone index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// Data-plane host of the index, e.g. `https://rag-abc123.svc.pinecone.io`
    #[serde(default)]
    pub index_host: String,

    /// API key; falls back to `PINECONE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Namespace holding the professor records
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_pinecone_timeout")]
    pub timeout_seconds: u64,
}

fn default_namespace() -> String {
    "ns1".to_string()
}

fn default_pinecone_timeout() -> u64 {
    30
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            index_host: String::new(),
            api_key: None,
            namespace: default_namespace(),
            timeout_seconds: default_pinecone_timeout(),
        }
    }
}

/// Terminal chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the chat route
    #[serde(default = "default_client_endpoint")]
    pub endpoint: String,
}

fn default_client_endpoint() -> String {
    "http://127.0.0.1:3000/api/chat".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_client_endpoint(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "profrag=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProfragError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ProfragError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Credentials
        if self.openai.api_key.is_none() {
            self.openai.api_key = non_empty_var("OPENAI_API_KEY");
        }
        if self.pinecone.api_key.is_none() {
            self.pinecone.api_key = non_empty_var("PINECONE_API_KEY");
        }

        if let Some(bind) = non_empty_var("PROFRAG_BIND_ADDRESS") {
            tracing::debug!(bind_address = %bind, "Env override: PROFRAG_BIND_ADDRESS");
            self.server.bind_address = bind;
        }

        if let Some(api_base) = non_empty_var("PROFRAG_OPENAI_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: PROFRAG_OPENAI_API_BASE");
            self.openai.api_base = api_base;
        }

        if let Some(model) = non_empty_var("PROFRAG_EMBEDDING_MODEL") {
            self.openai.embedding_model = model;
        }

        if let Some(model) = non_empty_var("PROFRAG_CHAT_MODEL") {
            self.openai.chat_model = model;
        }

        if let Some(host) = non_empty_var("PROFRAG_PINECONE_INDEX_HOST") {
            tracing::debug!(index_host = %host, "Env override: PROFRAG_PINECONE_INDEX_HOST");
            self.pinecone.index_host = host;
        }

        if let Some(namespace) = non_empty_var("PROFRAG_PINECONE_NAMESPACE") {
            self.pinecone.namespace = namespace;
        }

        if let Some(endpoint) = non_empty_var("PROFRAG_CLIENT_ENDPOINT") {
            self.client.endpoint = endpoint;
        }

        if let Ok(json_logs) = std::env::var("PROFRAG_LOG_JSON") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json = v,
                Err(_) => tracing::warn!("Invalid value for PROFRAG_LOG_JSON: {}", json_logs),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "profrag=debug".to_string();
        }

        match &cli.command {
            crate::cli::Commands::Serve { bind: Some(bind) } => {
                self.server.bind_address = bind.clone();
            }
            crate::cli::Commands::Chat {
                endpoint: Some(endpoint),
            }
            | crate::cli::Commands::Ask {
                endpoint: Some(endpoint),
                ..
            } => {
                self.client.endpoint = endpoint.clone();
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// Checks values every command depends on: addresses, URLs and timeouts.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self
            .server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ProfragError::Config(format!(
                "server.bind_address is not a socket address: {}",
                self.server.bind_address
            ))
            .into());
        }

        if url::Url::parse(&self.openai.api_base).is_err() {
            return Err(ProfragError::Config(format!(
                "openai.api_base is not a valid URL: {}",
                self.openai.api_base
            ))
            .into());
        }

        if url::Url::parse(&self.client.endpoint).is_err() {
            return Err(ProfragError::Config(format!(
                "client.endpoint is not a valid URL: {}",
                self.client.endpoint
            ))
            .into());
        }

        if self.openai.embedding_model.is_empty() || self.openai.chat_model.is_empty() {
            return Err(
                ProfragError::Config("openai model names cannot be empty".to_string()).into(),
            );
        }

        if self.openai.timeout_seconds == 0 || self.pinecone.timeout_seconds == 0 {
            return Err(
                ProfragError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Validate the settings the HTTP server needs on top of [`Config::validate`]
    ///
    /// # Errors
    ///
    /// Returns error if a credential or the index host is missing
    pub fn validate_for_server(&self) -> Result<()> {
        self.validate()?;

        if self.openai.api_key.is_none() {
            return Err(ProfragError::Config(
                "missing OpenAI API key (set OPENAI_API_KEY)".to_string(),
            )
            .into());
        }

        if self.pinecone.api_key.is_none() {
            return Err(ProfragError::Config(
                "missing Pinecone API key (set PINECONE_API_KEY)".to_string(),
            )
            .into());
        }

        if url::Url::parse(&self.pinecone.index_host).is_err() {
            return Err(ProfragError::Config(format!(
                "pinecone.index_host is not a valid URL: {:?}",
                self.pinecone.index_host
            ))
            .into());
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
