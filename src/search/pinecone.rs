//! Pinecone index backend
//!
//! Queries `POST {index_host}/query` within a single namespace.

use crate::config::PineconeConfig;
use crate::error::{ProfragError, Result};
use crate::search::{MatchResult, QueryRequest, VectorIndex};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Pinecone data-plane client for one index namespace
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    client: Client,
    config: PineconeConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PineconeQuery<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct PineconeResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    metadata: Option<ProfessorMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfessorMetadata {
    #[serde(default)]
    review: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    stars: Option<f64>,
}

impl PineconeIndex {
    /// Create a new index client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: PineconeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("profrag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProfragError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Pinecone index: host={}, namespace={}",
            config.index_host,
            config.namespace
        );

        Ok(Self { client, config })
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.config.index_host.trim_end_matches('/'))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<MatchResult>> {
        let body = PineconeQuery {
            namespace: &self.config.namespace,
            vector: &request.vector,
            top_k: request.top_k,
            include_metadata: request.include_metadata,
            filter: request.filter.as_ref(),
        };

        let mut builder = self.client.post(self.query_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Api-Key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Pinecone request failed: {}", e);
            ProfragError::Search(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Pinecone returned error {}: {}", status, error_text);
            return Err(ProfragError::Search(format!(
                "index returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let parsed: PineconeResponse = response
            .json()
            .await
            .map_err(|e| ProfragError::Search(format!("failed to parse response: {}", e)))?;

        Ok(parsed.matches.into_iter().map(into_match_result).collect())
    }
}

fn into_match_result(m: PineconeMatch) -> MatchResult {
    let metadata = m.metadata.unwrap_or_default();
    if metadata.review.is_none() || metadata.subject.is_none() || metadata.stars.is_none() {
        tracing::debug!(id = %m.id, "Match is missing metadata fields, using defaults");
    }
    tracing::trace!(id = %m.id, score = ?m.score, "Match");

    MatchResult {
        id: m.id,
        subject: metadata.subject.unwrap_or_default(),
        stars: metadata.stars.unwrap_or(0.0),
        review: metadata.review.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> PineconeConfig {
        PineconeConfig {
            index_host: server.uri(),
            api_key: Some("pc-test".to_string()),
            ..PineconeConfig::default()
        }
    }

    fn request(filter: Option<Value>) -> QueryRequest {
        QueryRequest {
            vector: vec![0.25, 0.5],
            top_k: 3,
            include_metadata: true,
            filter,
        }
    }

    #[tokio::test]
    async fn test_query_unfiltered_body_and_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("api-key", "pc-test"))
            .and(body_json(json!({
                "namespace": "ns1",
                "vector": [0.25, 0.5],
                "topK": 3,
                "includeMetadata": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    {"id": "Dr. Ada", "score": 0.91, "metadata": {
                        "review": "Clear lectures", "subject": "Data Science", "stars": 5
                    }},
                    {"id": "Dr. Bo", "score": 0.80, "metadata": {
                        "review": "Tough grader", "subject": "Statistics", "stars": 3.5
                    }}
                ],
                "namespace": "ns1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let index = PineconeIndex::new(config_for(&server)).unwrap();
        let matches = index.query(&request(None)).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "Dr. Ada");
        assert_eq!(matches[0].stars, 5.0);
        assert_eq!(matches[1].subject, "Statistics");
        assert_eq!(matches[1].review, "Tough grader");
    }

    #[tokio::test]
    async fn test_query_sends_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({
                "namespace": "ns1",
                "vector": [0.25, 0.5],
                "topK": 3,
                "includeMetadata": true,
                "filter": {"rating": {"$eq": 4.5}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
            .expect(1)
            .mount(&server)
            .await;

        let index = PineconeIndex::new(config_for(&server)).unwrap();
        let matches = index
            .query(&request(Some(json!({"rating": {"$eq": 4.5}}))))
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_missing_metadata_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [{"id": "Prof. X"}, {"id": "Prof. Y", "metadata": {"subject": "Art"}}]
            })))
            .mount(&server)
            .await;

        let index = PineconeIndex::new(config_for(&server)).unwrap();
        let matches = index.query(&request(None)).await.unwrap();

        assert_eq!(
            matches[0],
            MatchResult {
                id: "Prof. X".to_string(),
                subject: String::new(),
                stars: 0.0,
                review: String::new(),
            }
        );
        assert_eq!(matches[1].subject, "Art");
    }

    #[tokio::test]
    async fn test_non_success_is_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let index = PineconeIndex::new(config_for(&server)).unwrap();
        let err = index.query(&request(None)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProfragError>(),
            Some(ProfragError::Search(_))
        ));
    }
}
