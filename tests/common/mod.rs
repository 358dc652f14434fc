//! Shared helpers for integration tests
//!
//! Upstream services (OpenAI-compatible API and the Pinecone index) are
//! replaced by `wiremock` servers.

use profrag::config::Config;
use profrag::server::{serve_with_listener, AppState};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Mock OpenAI and Pinecone servers
pub struct Upstreams {
    pub openai: MockServer,
    pub pinecone: MockServer,
}

#[allow(dead_code)]
impl Upstreams {
    pub async fn start() -> Self {
        Self {
            openai: MockServer::start().await,
            pinecone: MockServer::start().await,
        }
    }

    /// Configuration pointing at the mock servers
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.openai.api_base = format!("{}/v1", self.openai.uri());
        config.openai.api_key = Some("sk-test".to_string());
        config.pinecone.index_host = self.pinecone.uri();
        config.pinecone.api_key = Some("pc-test".to_string());
        config
    }

    pub async fn mount_embeddings(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.12, 0.34, 0.56]}]
            })))
            .mount(&self.openai)
            .await;
    }

    pub async fn mount_embeddings_failure(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.openai)
            .await;
    }

    pub async fn mount_query(&self, matches: Value) {
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": matches,
                "namespace": "ns1"
            })))
            .mount(&self.pinecone)
            .await;
    }

    pub async fn mount_chat(&self, deltas: &[&str]) {
        self.mount_chat_raw(sse_body(deltas)).await;
    }

    pub async fn mount_chat_raw(&self, body: Vec<u8>) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&self.openai)
            .await;
    }

    /// JSON bodies of every request received on `path_suffix`
    pub async fn bodies(server: &MockServer, path_suffix: &str) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path().ends_with(path_suffix))
            .map(|r| serde_json::from_slice(&r.body).expect("request body is JSON"))
            .collect()
    }
}

/// Three professor matches as returned by the index
#[allow(dead_code)]
pub fn data_science_matches() -> Value {
    json!([
        {"id": "Dr. Alice Smith", "score": 0.93, "metadata": {
            "review": "Engaging lectures and practical projects.",
            "subject": "Data Science", "stars": 4.8
        }},
        {"id": "Prof. John Doe", "score": 0.90, "metadata": {
            "review": "Real-world examples, fair exams.",
            "subject": "Machine Learning", "stars": 4.7
        }},
        {"id": "Dr. Emily Johnson", "score": 0.87, "metadata": {
            "review": "Explains complex topics clearly.",
            "subject": "Big Data", "stars": 4.6
        }}
    ])
}

/// Streamed completion body carrying `deltas`, terminated by `[DONE]`
pub fn sse_body(deltas: &[&str]) -> Vec<u8> {
    let mut body = String::from("data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for delta in deltas {
        let event = json!({"choices": [{"delta": {"content": delta}}]});
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

/// A running server on an ephemeral port
pub struct RunningServer {
    pub endpoint: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the real router with the production pipeline built from `config`
#[allow(dead_code)]
pub async fn spawn_server(config: &Config) -> RunningServer {
    let state = AppState::from_config(config).expect("state builds");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        serve_with_listener(listener, state, shutdown)
            .await
            .expect("server runs");
    });

    RunningServer {
        endpoint: format!("http://{}/api/chat", addr),
        shutdown: Some(tx),
    }
}
