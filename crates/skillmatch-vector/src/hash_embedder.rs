//! FNV-1a feature hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed into one of `dimension`
//! buckets with a sign taken from the top hash bit. The result is a sparse
//! bag-of-words vector: texts sharing tokens point in similar directions.
//! Text with no tokens hashes its trimmed form as a single feature, so only
//! blank text maps to the zero vector.
//! Deterministic and offline, so it is the default provider and the one
//! the test suites rank against.

use crate::embedding::EmbeddingProvider;
use async_trait::async_trait;
use skillmatch_core::Result;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature hashing embedding provider.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hashed_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return embedding;
        }

        let mut any_token = false;
        for token in tokenize(text) {
            any_token = true;
            self.add_feature(&mut embedding, token.as_bytes());
        }

        let trimmed = text.trim();
        if !any_token && !trimmed.is_empty() {
            self.add_feature(&mut embedding, trimmed.as_bytes());
        }

        embedding
    }

    fn add_feature(&self, embedding: &mut [f32], bytes: &[u8]) {
        let hash = fnv1a(bytes);
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
        embedding[bucket] += sign;
    }
}

/// Split text into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.hashed_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.hashed_embedding(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn model(&self) -> &str {
        "fnv1a-bow"
    }
}
