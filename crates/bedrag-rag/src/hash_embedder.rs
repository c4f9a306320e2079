//! Offline feature-hashing embedder

use async_trait::async_trait;

use bedrag_core::{Embedder, EmbeddingVector, Error, Result};

/// Default dimensionality of [`HashEmbedder`] vectors
pub const DEFAULT_HASH_DIMENSION: usize = 384;

const MODEL_ID: &str = "local-hash-embedder";

/// Deterministic embedder that hashes words and word bigrams into a fixed
/// number of buckets.
///
/// It needs no credentials, so the demo can run without an embedding service.
/// Texts that share vocabulary land close together; it carries no semantics
/// beyond that.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = md5::compute(feature.as_bytes());
        let bytes = digest.0;
        let hash = u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]);
        // One spare bit picks the sign so collisions partly cancel out
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        ((hash % self.dimension as u64) as usize, sign)
    }

    fn embed_sync(&self, text: &str) -> Result<EmbeddingVector> {
        if self.dimension == 0 {
            return Err(Error::embedding("hash embedder dimension must be positive"));
        }

        let words = tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];

        for word in &words {
            let (idx, sign) = self.bucket(word);
            vector[idx] += sign;
        }
        for pair in words.windows(2) {
            let (idx, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[idx] += sign * 0.5;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }
        Ok(vector)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.embed_sync(text)
    }

    fn model_id(&self) -> &str {
        MODEL_ID
    }
}

/// Lowercased alphanumeric runs
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}
