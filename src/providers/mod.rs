//! Provider module for profrag
//!
//! This module contains the model service abstractions (embedding and
//! streamed generation) and the OpenAI-compatible implementation.

pub mod base;
pub mod openai;
pub mod sse;

pub use base::{ChatModel, DeltaStream, Embedder, Message, Role};
pub use openai::OpenAiProvider;

use crate::config::OpenAiConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the embedding and generation services from configuration
///
/// Both handles share one provider instance, and therefore one HTTP
/// connection pool.
///
/// # Errors
///
/// Returns error if the provider cannot be initialized
pub fn create_model_services(
    config: &OpenAiConfig,
) -> Result<(Arc<dyn Embedder>, Arc<dyn ChatModel>)> {
    let provider = Arc::new(OpenAiProvider::new(config.clone())?);
    let embedder: Arc<dyn Embedder> = provider.clone();
    let generator: Arc<dyn ChatModel> = provider;
    Ok((embedder, generator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model_services() {
        assert!(create_model_services(&OpenAiConfig::default()).is_ok());
    }
}
