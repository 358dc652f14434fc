//! Retrieval-augmented query pipeline
//!
//! Runs one chat request through intent parsing, embedding, vector search,
//! prompt assembly and the start of generation. Every step is awaited in
//! sequence; any failure before the first delta is returned to the caller.

use crate::error::{ProfragError, Result};
use crate::intent::{IntentParser, SearchCriteria};
use crate::prompts::assemble_prompt;
use crate::providers::{ChatModel, DeltaStream, Embedder, Message};
use crate::search::{MatchResult, VectorSearchClient};
use std::sync::Arc;

/// Everything produced before streaming starts
pub struct PreparedAnswer {
    /// Criteria parsed from the newest message
    pub criteria: SearchCriteria,
    /// Matches returned by the index
    pub matches: Vec<MatchResult>,
    /// Number of messages sent to the generation service
    pub prompt_len: usize,
    /// Generated text deltas
    pub deltas: DeltaStream,
}

/// Orchestrates a single request
///
/// Holds only shared, immutable collaborators; one instance serves all
/// concurrent requests.
pub struct RagPipeline {
    parser: IntentParser,
    embedder: Arc<dyn Embedder>,
    search: VectorSearchClient,
    generator: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl RagPipeline {
    /// Create a pipeline from its collaborators
    pub fn new(
        parser: IntentParser,
        embedder: Arc<dyn Embedder>,
        search: VectorSearchClient,
        generator: Arc<dyn ChatModel>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            embedder,
            search,
            generator,
            system_prompt: system_prompt.into(),
        }
    }

    /// Prepares the answer for a conversation
    ///
    /// `history` is the full conversation; its last element is the newest
    /// user message.
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Input` if the newest message is missing or
    /// empty (checked before any external call), otherwise the first
    /// embedding, search or generation failure.
    pub async fn prepare(&self, history: &[Message]) -> Result<PreparedAnswer> {
        let query = history
            .last()
            .map(Message::text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProfragError::Input("No content provided.".to_string()))?;

        let criteria = self.parser.parse(query);
        tracing::info!(criteria = ?criteria, "Parsed search criteria");

        let vector = self.embedder.embed(query).await?;

        let matches = self.search.search(vector, &criteria).await?;
        tracing::info!(matches = matches.len(), "Retrieved professor matches");
        if matches.is_empty() {
            tracing::info!("No matches found, using fallback context");
        }

        let prompt = assemble_prompt(&self.system_prompt, history, &matches)?;
        tracing::debug!(prompt_len = prompt.len(), "Assembled prompt");

        let deltas = self.generator.stream_chat(&prompt).await?;

        Ok(PreparedAnswer {
            criteria,
            matches,
            prompt_len: prompt.len(),
            deltas,
        })
    }
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("parser", &self.parser)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{CONTEXT_HEADER, FALLBACK_CONTEXT};
    use crate::providers::Role;
    use crate::test_utils::{
        assert_error_contains, sample_matches, FakeChatModel, FakeEmbedder, FakeIndex,
    };
    use futures::StreamExt;

    struct Harness {
        embedder: Arc<FakeEmbedder>,
        index: Arc<FakeIndex>,
        generator: Arc<FakeChatModel>,
        pipeline: RagPipeline,
    }

    fn harness(embedder: FakeEmbedder, index: FakeIndex, generator: FakeChatModel) -> Harness {
        let embedder = Arc::new(embedder);
        let index = Arc::new(index);
        let generator = Arc::new(generator);
        let pipeline = RagPipeline::new(
            IntentParser::new().unwrap(),
            embedder.clone(),
            VectorSearchClient::new(index.clone()),
            generator.clone(),
            "system instructions",
        );
        Harness {
            embedder,
            index,
            generator,
            pipeline,
        }
    }

    async fn collect_text(deltas: DeltaStream) -> String {
        deltas
            .filter_map(|item| async move { item.ok().flatten() })
            .collect::<Vec<_>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn test_data_science_query_uses_three_matches() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(sample_matches()),
            FakeChatModel::replying(&["Dr. Alice Smith ", "is a great choice."]),
        );
        let history = vec![
            Message::assistant("Hi! How can I help you today?"),
            Message::user("top professors for data science"),
        ];

        let prepared = h.pipeline.prepare(&history).await.unwrap();

        assert_eq!(prepared.matches.len(), 3);
        assert_eq!(prepared.prompt_len, 3);
        let prompt = &h.generator.prompts()[0];
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[1], history[0]);
        for m in sample_matches() {
            assert!(prompt[2].text().contains(&format!("Professor: {}", m.id)));
        }
        let answer = collect_text(prepared.deltas).await;
        assert_eq!(answer, "Dr. Alice Smith is a great choice.");
    }

    #[tokio::test]
    async fn test_no_matches_falls_back_without_error() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(Vec::new()),
            FakeChatModel::replying(&["Could you tell me more?"]),
        );
        let history = vec![Message::user("asdf qwer zxcv")];

        let prepared = h.pipeline.prepare(&history).await.unwrap();

        assert!(prepared.criteria.is_empty());
        assert!(prepared.matches.is_empty());
        assert!(h.index.requests()[0].filter.is_none());
        let prompt = &h.generator.prompts()[0];
        assert!(prompt[1].text().contains(FALLBACK_CONTEXT));
        assert!(!prompt[1].text().contains(CONTEXT_HEADER));
        assert!(!collect_text(prepared.deltas).await.is_empty());
    }

    #[tokio::test]
    async fn test_criteria_reach_the_index() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(Vec::new()),
            FakeChatModel::replying(&["ok"]),
        );
        let history = vec![Message::user("I want ratings around 4.5 stars")];

        let prepared = h.pipeline.prepare(&history).await.unwrap();

        assert_eq!(prepared.criteria.rating, Some(4.5));
        let filter = h.index.requests()[0].filter.clone().unwrap();
        assert_eq!(filter["rating"]["$eq"], 4.5);
    }

    #[tokio::test]
    async fn test_empty_history_rejected_before_external_calls() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(sample_matches()),
            FakeChatModel::replying(&["x"]),
        );

        let err = match h.pipeline.prepare(&[]).await {
            Ok(_) => panic!("expected input error"),
            Err(e) => e,
        };

        assert_eq!(err.to_string(), "No content provided.");
        assert_eq!(h.embedder.calls(), 0);
        assert!(h.index.requests().is_empty());
        assert!(h.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_newest_content_rejected() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(sample_matches()),
            FakeChatModel::replying(&["x"]),
        );
        let history = vec![
            Message::user("hello"),
            Message {
                role: Role::User,
                content: None,
            },
        ];

        let result = h.pipeline.prepare(&history).await;
        assert!(result.is_err());
        assert_eq!(h.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_stops_pipeline() {
        let h = harness(
            FakeEmbedder::failing("quota exceeded"),
            FakeIndex::new(sample_matches()),
            FakeChatModel::replying(&["x"]),
        );

        let err = match h.pipeline.prepare(&[Message::user("physics")]).await {
            Ok(_) => panic!("expected embedding error"),
            Err(e) => e,
        };

        assert_error_contains(&err, "quota exceeded");
        assert!(h.index.requests().is_empty());
        assert!(h.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_stops_pipeline() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::failing("index unavailable"),
            FakeChatModel::replying(&["x"]),
        );

        let err = match h.pipeline.prepare(&[Message::user("physics")]).await {
            Ok(_) => panic!("expected search error"),
            Err(e) => e,
        };

        assert_error_contains(&err, "index unavailable");
        assert!(h.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generation_rejection_is_error() {
        let h = harness(
            FakeEmbedder::new(),
            FakeIndex::new(sample_matches()),
            FakeChatModel::rejecting("model not found"),
        );

        let result = h.pipeline.prepare(&[Message::user("physics")]).await;
        assert!(result.is_err());
    }
}
