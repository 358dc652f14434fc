//! Test utilities for profrag
//!
//! In-memory stand-ins for the embedding, vector index and generation
//! services, plus sample professor records.

use crate::error::{ProfragError, Result};
use crate::providers::{ChatModel, DeltaStream, Embedder, Message};
use crate::search::{MatchResult, QueryRequest, VectorIndex};
use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Three professor records for data science queries
pub fn sample_matches() -> Vec<MatchResult> {
    vec![
        MatchResult {
            id: "Dr. Alice Smith".to_string(),
            subject: "Data Science".to_string(),
            stars: 4.8,
            review: "Engaging lectures and practical projects.".to_string(),
        },
        MatchResult {
            id: "Prof. John Doe".to_string(),
            subject: "Machine Learning".to_string(),
            stars: 4.7,
            review: "Real-world examples, fair exams.".to_string(),
        },
        MatchResult {
            id: "Dr. Emily Johnson".to_string(),
            subject: "Big Data".to_string(),
            stars: 4.6,
            review: "Explains complex topics clearly.".to_string(),
        },
    ]
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the error message does not contain the expected text
pub fn assert_error_contains(err: &anyhow::Error, expected: &str) {
    let message = err.to_string();
    assert!(
        message.contains(expected),
        "Expected error containing '{}', got '{}'",
        expected,
        message
    );
}

/// Embedder returning a fixed vector and counting calls
#[derive(Debug, Default)]
pub struct FakeEmbedder {
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _input: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(ProfragError::Embedding(message.clone()).into()),
            None => Ok(vec![0.1, 0.2, 0.3]),
        }
    }
}

/// Index returning canned matches and recording every query
#[derive(Debug, Default)]
pub struct FakeIndex {
    matches: Vec<MatchResult>,
    fail_with: Option<String>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl FakeIndex {
    pub fn new(matches: Vec<MatchResult>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<MatchResult>> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.fail_with {
            Some(message) => Err(ProfragError::Search(message.clone()).into()),
            None => Ok(self.matches.clone()),
        }
    }
}

/// Scripted item for [`FakeChatModel`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Delta(&'static str),
    Skip,
    Fail(&'static str),
}

/// Chat model replaying a scripted delta sequence
#[derive(Debug, Default)]
pub struct FakeChatModel {
    script: Vec<Scripted>,
    reject_with: Option<String>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl FakeChatModel {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Model that streams the given text pieces
    pub fn replying(pieces: &[&'static str]) -> Self {
        Self::new(pieces.iter().map(|p| Scripted::Delta(*p)).collect())
    }

    /// Model that rejects the request before streaming
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn stream_chat(&self, messages: &[Message]) -> Result<DeltaStream> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        if let Some(message) = &self.reject_with {
            return Err(ProfragError::Generation(message.clone()).into());
        }

        let items: Vec<Result<Option<String>>> = self
            .script
            .iter()
            .map(|s| match s {
                Scripted::Delta(text) => Ok(Some(text.to_string())),
                Scripted::Skip => Ok(None),
                Scripted::Fail(message) => {
                    Err(ProfragError::Generation(message.to_string()).into())
                }
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}
