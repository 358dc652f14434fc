//! HTTP server exposing the chat route
//!
//! The server is stateless between requests: [`AppState`] carries only the
//! shared pipeline, whose collaborators are immutable.

pub mod chat;
pub mod error;

pub use error::ServerError;

use crate::config::Config;
use crate::error::Result;
use crate::intent::IntentParser;
use crate::pipeline::RagPipeline;
use crate::prompts::build_system_prompt;
use crate::providers::create_model_services;
use crate::search::{PineconeIndex, VectorSearchClient};
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared state handed to every request
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
}

impl AppState {
    /// Wrap an existing pipeline
    pub fn new(pipeline: RagPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build the production pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client or the intent rules cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let (embedder, generator) = create_model_services(&config.openai)?;
        let index = Arc::new(PineconeIndex::new(config.pinecone.clone())?);

        Ok(Self::new(RagPipeline::new(
            IntentParser::new()?,
            embedder,
            VectorSearchClient::new(index),
            generator,
            build_system_prompt(),
        )))
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .layer(DefaultBodyLimit::max(chat::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// # Errors
///
/// Returns error if the server fails while running
pub async fn serve_with_listener<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Run the server described by `config` until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns error if the configuration is incomplete, the address cannot be
/// bound, or the server fails
pub async fn run(config: &Config) -> Result<()> {
    config.validate_for_server()?;

    let state = AppState::from_config(config)?;
    let addr: SocketAddr = config.server.bind_address.parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    serve_with_listener(listener, state, shutdown_signal()).await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received, finishing in-flight requests");
}
