//! Deterministic fakes for the embedding and generation services

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bedrag_core::{
    Embedder, EmbeddingVector, Error, GenerationResult, Generator, Prompt, Result,
};

const VOCABULARY: [&str; 10] = [
    "bedrock",
    "managed",
    "ai",
    "service",
    "paris",
    "capital",
    "france",
    "rag",
    "retrieval",
    "generation",
];

/// Bag-of-keywords embedder over a tiny fixed vocabulary
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .collect();
        Ok(VOCABULARY
            .iter()
            .map(|term| words.iter().filter(|w| w.as_str() == *term).count() as f32)
            .collect())
    }

    fn model_id(&self) -> &str {
        "keyword-test"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<EmbeddingVector> {
        Err(Error::embedding("embedding endpoint unreachable"))
    }

    fn model_id(&self) -> &str {
        "failing-embedder"
    }
}

/// Echoes a fixed answer and remembers every prompt it was given
pub struct RecordingGenerator {
    prompts: Mutex<Vec<Prompt>>,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<GenerationResult> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(GenerationResult::new(
            format!("answer ({} tokens max)", max_tokens),
            "recording-test",
        ))
    }

    fn model_id(&self) -> &str {
        "recording-test"
    }
}

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &Prompt, _max_tokens: u32) -> Result<GenerationResult> {
        Err(Error::generation("response lacks a completion"))
    }

    fn model_id(&self) -> &str {
        "failing-generator"
    }
}
