//! RAG pipeline: embed, retrieve, augment, generate
//!
//! A [`RagPipeline`] holds shared handles to its collaborators and no state
//! between calls. Each run walks a small state machine that is logged and
//! returned with the answer so callers can see how far a run got.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use bedrag_core::{
    Embedder, Error, GenerationResult, Generator, Prompt, Result, RetrievalResult, VectorStore,
};

use crate::prompt::PromptBuilder;
use crate::retriever::Retriever;

/// Stage of a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Embedding,
    Retrieving,
    Prompting,
    Generating,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Embedding => "embedding",
            Self::Retrieving => "retrieving",
            Self::Prompting => "prompting",
            Self::Generating => "generating",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Number of documents placed in the prompt
    pub top_k: usize,
    /// Completion token limit passed to the generator
    pub max_tokens: u32,
    /// Minimum cosine similarity for a document to be used as context
    pub similarity_floor: Option<f32>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_tokens: 500,
            similarity_floor: None,
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub generation: GenerationResult,
    pub prompt: Prompt,
    /// Retrieved context, empty on the no-retrieval path
    pub sources: RetrievalResult,
    pub states: Vec<PipelineState>,
}

impl Answer {
    pub fn text(&self) -> &str {
        &self.generation.text
    }
}

/// Both answers to one query; each side fails independently
#[derive(Debug)]
pub struct Comparison {
    pub query: String,
    pub with_rag: Result<Answer>,
    pub without_rag: Result<Answer>,
}

struct Run {
    mode: &'static str,
    state: PipelineState,
    visited: Vec<PipelineState>,
}

impl Run {
    fn start(mode: &'static str) -> Self {
        Self {
            mode,
            state: PipelineState::Idle,
            visited: vec![PipelineState::Idle],
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug!(mode = self.mode, from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.visited.push(next);
    }

    /// Pass a step's result through, moving to `Failed` on error
    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        result.inspect_err(|err| {
            warn!(mode = self.mode, state = %self.state, error = %err, "pipeline run failed");
            self.state = PipelineState::Failed;
            self.visited.push(PipelineState::Failed);
        })
    }

    fn finish(mut self, generation: GenerationResult, prompt: Prompt, sources: RetrievalResult) -> Answer {
        self.advance(PipelineState::Done);
        Answer {
            generation,
            prompt,
            sources,
            states: self.visited,
        }
    }
}

/// Orchestrates embedder, retriever, prompt builder and generator
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    generator: Arc<dyn Generator>,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            retriever: Retriever::new(store),
            prompt_builder: PromptBuilder::default(),
            generator,
            config: RagConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.retriever = self
            .retriever
            .with_similarity_floor(config.similarity_floor);
        self.config = config;
        self
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        self.retriever.store()
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Answer using the closest stored documents as context
    pub async fn answer_with_rag(&self, query: &str) -> Result<Answer> {
        validate_query(query)?;
        let mut run = Run::start("rag");

        run.advance(PipelineState::Embedding);
        let vector = run.check(self.embedder.embed(query).await)?;

        run.advance(PipelineState::Retrieving);
        let sources = run.check(self.retriever.retrieve(&vector, self.config.top_k).await)?;
        debug!(hits = sources.len(), top_k = self.config.top_k, "retrieved context");

        run.advance(PipelineState::Prompting);
        let prompt = self.prompt_builder.build(query, &sources.texts());

        run.advance(PipelineState::Generating);
        let generation = run.check(self.generator.generate(&prompt, self.config.max_tokens).await)?;

        Ok(run.finish(generation, prompt, sources))
    }

    /// Answer from the bare query, skipping retrieval
    pub async fn answer_without_rag(&self, query: &str) -> Result<Answer> {
        validate_query(query)?;
        let mut run = Run::start("direct");

        run.advance(PipelineState::Prompting);
        let no_context: [&str; 0] = [];
        let prompt = self.prompt_builder.build(query, &no_context);

        run.advance(PipelineState::Generating);
        let generation = run.check(self.generator.generate(&prompt, self.config.max_tokens).await)?;

        Ok(run.finish(generation, prompt, RetrievalResult::default()))
    }

    /// Run both paths concurrently and pair their outcomes
    pub async fn compare(&self, query: &str) -> Comparison {
        let (with_rag, without_rag) =
            futures::join!(self.answer_with_rag(query), self.answer_without_rag(query));

        Comparison {
            query: query.to_string(),
            with_rag,
            without_rag,
        }
    }
}

fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::InvalidInput("query must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingEmbedder, FailingGenerator, KeywordEmbedder, RecordingGenerator};
    use crate::InMemoryVectorStore;
    use bedrag_core::Document;

    async fn seeded_store(embedder: &KeywordEmbedder) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        let texts = [
            "Bedrock is a managed AI service.",
            "Paris is the capital of France.",
            "RAG combines retrieval and generation.",
        ];
        for (i, text) in texts.iter().enumerate() {
            let vector = embedder.embed(text).await.unwrap();
            store
                .upsert(Document::new(format!("doc_{}", i), *text), vector)
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_rag_states_in_order() {
        let embedder = KeywordEmbedder::new();
        let store = seeded_store(&embedder).await;
        let pipeline = RagPipeline::new(
            Arc::new(embedder),
            store,
            Arc::new(RecordingGenerator::new()),
        );

        let answer = pipeline.answer_with_rag("What is Bedrock?").await.unwrap();
        assert_eq!(
            answer.states,
            vec![
                PipelineState::Idle,
                PipelineState::Embedding,
                PipelineState::Retrieving,
                PipelineState::Prompting,
                PipelineState::Generating,
                PipelineState::Done,
            ]
        );
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(answer.text(), "answer (500 tokens max)");
    }

    #[tokio::test]
    async fn test_direct_path_skips_retrieval() {
        let generator = Arc::new(RecordingGenerator::new());
        let pipeline = RagPipeline::new(
            Arc::new(FailingEmbedder),
            Arc::new(InMemoryVectorStore::new()),
            generator.clone(),
        );

        let answer = pipeline.answer_without_rag("What is Bedrock?").await.unwrap();
        assert!(answer.sources.is_empty());
        assert_eq!(answer.prompt.as_str(), "What is Bedrock?");
        assert_eq!(
            answer.states,
            vec![
                PipelineState::Idle,
                PipelineState::Prompting,
                PipelineState::Generating,
                PipelineState::Done,
            ]
        );
        assert_eq!(generator.prompts(), vec![Prompt::new("What is Bedrock?")]);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let generator = Arc::new(RecordingGenerator::new());
        let pipeline = RagPipeline::new(
            Arc::new(FailingEmbedder),
            Arc::new(InMemoryVectorStore::new()),
            generator.clone(),
        );

        let err = pipeline.answer_with_rag("What is Bedrock?").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingService(_)));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let embedder = KeywordEmbedder::new();
        let store = seeded_store(&embedder).await;
        let pipeline = RagPipeline::new(Arc::new(embedder), store, Arc::new(FailingGenerator));

        assert!(matches!(
            pipeline.answer_with_rag("What is Bedrock?").await,
            Err(Error::GenerationService(_))
        ));
        assert!(matches!(
            pipeline.answer_without_rag("What is Bedrock?").await,
            Err(Error::GenerationService(_))
        ));
    }

    #[tokio::test]
    async fn test_config_controls_k_and_tokens() {
        let embedder = KeywordEmbedder::new();
        let store = seeded_store(&embedder).await;
        let pipeline = RagPipeline::new(
            Arc::new(embedder),
            store,
            Arc::new(RecordingGenerator::new()),
        )
        .with_config(RagConfig {
            top_k: 2,
            max_tokens: 64,
            similarity_floor: Some(0.1),
        });

        let answer = pipeline.answer_with_rag("What is Bedrock?").await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources.hits[0].document.id, "doc_0");
        assert_eq!(answer.text(), "answer (64 tokens max)");
    }

    #[tokio::test]
    async fn test_empty_store_still_answers() {
        let generator = Arc::new(RecordingGenerator::new());
        let pipeline = RagPipeline::new(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(InMemoryVectorStore::new()),
            generator.clone(),
        );

        let answer = pipeline.answer_with_rag("What is Bedrock?").await.unwrap();
        assert!(answer.sources.is_empty());
        assert_eq!(answer.prompt.as_str(), "What is Bedrock?");
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let pipeline = RagPipeline::new(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(RecordingGenerator::new()),
        );
        assert!(matches!(
            pipeline.answer_with_rag("   ").await,
            Err(Error::InvalidInput(_))
        ));

        let comparison = pipeline.compare("").await;
        assert!(comparison.with_rag.is_err());
        assert!(comparison.without_rag.is_err());
    }
}
