//! Embedding provider trait, mock implementation, and the embedding adapter.
//!
//! This module defines the `EmbeddingProvider` trait that abstracts over
//! different embedding generation backends (feature hashing, fastembed,
//! remote HTTP services), and the [`EmbeddingAdapter`] that every caller
//! goes through. Providers return raw vectors; the adapter batches input,
//! bounds each call with a timeout, validates the output and normalizes it
//! to unit length.
//!
//! # Providers
//!
//! - `HashEmbeddingProvider`: Feature-hashing bag of words, offline
//! - `MockEmbeddingProvider`: Deterministic byte-derived vectors for testing
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `vector-fastembed` feature)
//! - `HttpEmbeddingProvider`: OpenAI-compatible endpoint (requires `embedding-http` feature)

use crate::hash_embedder::HashEmbeddingProvider;
use crate::types::EmbeddingConfig;
use async_trait::async_trait;
use skillmatch_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Trait for generating text embeddings.
///
/// Implementations wrap specific embedding libraries or services and
/// provide a uniform async interface. The trait requires `Send + Sync` to
/// allow safe sharing across async tasks.
///
/// # Thread Safety
///
/// Implementations should handle internal synchronization (e.g., `Arc<Mutex<>>`)
/// for thread-unsafe underlying libraries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts, in input order.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    /// Backends that support native batching should override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;

    /// The model identity. Index build and query must agree on it.
    fn model(&self) -> &str {
        self.name()
    }
}

/// A mock embedding provider for testing.
///
/// Generates deterministic vectors based on the input text bytes. The
/// vectors are deliberately left unnormalized.
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        (0..self.dimension)
            .map(|i| {
                let byte_val = if bytes.is_empty() {
                    0u8
                } else {
                    bytes[i % bytes.len()]
                };
                ((byte_val as f32 + i as f32) % 256.0) / 64.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.deterministic_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| self.deterministic_embedding(t))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Euclidean norm of a vector.
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt() as f32
}

/// Scale a vector to unit L2 norm.
///
/// Fails on non-finite components or a zero vector, neither of which has a
/// direction to preserve.
pub fn normalize(mut vector: Vec<f32>) -> Result<Vec<f32>> {
    if let Some(pos) = vector.iter().position(|x| !x.is_finite()) {
        return Err(Error::embedding_unavailable(format!(
            "non-finite component at index {pos}"
        )));
    }

    let norm = vector
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return Err(Error::embedding_unavailable("zero-norm embedding"));
    }

    for val in &mut vector {
        *val = (f64::from(*val) / norm) as f32;
    }
    Ok(vector)
}

// ============================================================================
// Adapter
// ============================================================================

/// Wraps an [`EmbeddingProvider`] with batching, a per-call timeout,
/// output validation and unit normalization.
///
/// Every failure surfaces as [`Error::EmbeddingUnavailable`].
#[derive(Clone)]
pub struct EmbeddingAdapter {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Duration,
    batch_size: usize,
}

impl EmbeddingAdapter {
    /// Create an adapter with a 30 second timeout and batches of 64.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(30),
            batch_size: 64,
        }
    }

    /// Build the configured provider and wrap it.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let provider = create_embedding_provider(config)?;
        Ok(Self::new(provider)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_batch_size(config.batch_size))
    }

    /// Set the timeout applied to each provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of texts sent per provider call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The embedding dimension of the wrapped provider.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Provider name.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Model name.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// `provider/model`, recorded in index manifests.
    pub fn model_id(&self) -> String {
        format!("{}/{}", self.provider.name(), self.provider.model())
    }

    /// Embed a batch of texts into unit vectors, in input order.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let raw = self.call_provider(chunk).await?;
            if raw.len() != chunk.len() {
                return Err(Error::embedding_unavailable(format!(
                    "{} returned {} embeddings for {} inputs",
                    self.provider.name(),
                    raw.len(),
                    chunk.len()
                )));
            }
            for vector in raw {
                vectors.push(self.validate(vector)?);
            }
        }
        log::debug!(
            "Embedded {} texts with {}",
            vectors.len(),
            self.provider.name()
        );
        Ok(vectors)
    }

    /// Embed a single text into a unit vector.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding_unavailable("No embedding returned"))
    }

    async fn call_provider(&self, chunk: &[&str]) -> Result<Vec<Vec<f32>>> {
        match tokio::time::timeout(self.timeout, self.provider.embed_batch(chunk)).await {
            Ok(Ok(vectors)) => Ok(vectors),
            Ok(Err(e)) if e.is_embedding_unavailable() => Err(e),
            Ok(Err(e)) => Err(Error::embedding_unavailable(format!(
                "{} failed: {e}",
                self.provider.name()
            ))),
            Err(_) => Err(Error::embedding_unavailable(format!(
                "{} timed out after {:?}",
                self.provider.name(),
                self.timeout
            ))),
        }
    }

    fn validate(&self, vector: Vec<f32>) -> Result<Vec<f32>> {
        let expected = self.provider.dimension();
        if vector.len() != expected {
            return Err(Error::embedding_unavailable(format!(
                "{} returned dimension {}, expected {expected}",
                self.provider.name(),
                vector.len()
            )));
        }
        normalize(vector)
    }
}

impl std::fmt::Debug for EmbeddingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingAdapter")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("timeout", &self.timeout)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create the embedding provider named by `config.provider`.
pub fn create_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "hash" | "mock" if config.dimension == 0 => Err(Error::config(format!(
            "embedding.dimension must be positive for the '{}' provider",
            config.provider
        ))),
        "hash" => Ok(Arc::new(HashEmbeddingProvider::new(config.dimension))),
        "mock" => Ok(Arc::new(MockEmbeddingProvider::new(config.dimension))),
        #[cfg(feature = "vector-fastembed")]
        "fastembed" => Ok(Arc::new(crate::fastembed::FastEmbedProvider::new(
            &config.model,
            config.cache_path.as_deref(),
        )?)),
        #[cfg(not(feature = "vector-fastembed"))]
        "fastembed" => Err(Error::config(
            "The 'fastembed' provider requires the `vector-fastembed` feature",
        )),
        #[cfg(feature = "embedding-http")]
        "http" => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| Error::config("embedding.endpoint is required for 'http'"))?;
            Ok(Arc::new(crate::http::HttpEmbeddingProvider::new(
                endpoint,
                &config.model,
                config.api_key.clone(),
                config.dimension,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        #[cfg(not(feature = "embedding-http"))]
        "http" => Err(Error::config(
            "The 'http' provider requires the `embedding-http` feature",
        )),
        other => Err(Error::config(format!(
            "Unknown embedding provider: '{other}'. Supported: hash, mock, fastembed, http"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::operation("connection refused"))
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl EmbeddingProvider for SlowProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![1.0; 4])
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    /// Returns a fixed vector regardless of input.
    struct FixedProvider {
        vector: Vec<f32>,
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixed(vector: Vec<f32>, dimension: usize) -> EmbeddingAdapter {
        EmbeddingAdapter::new(Arc::new(FixedProvider { vector, dimension }))
    }

    #[test]
    fn test_mock_provider_creation() {
        let provider = MockEmbeddingProvider::new(384);
        assert_eq!(provider.dimension(), 384);
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.model(), "mock");
    }

    #[tokio::test]
    async fn test_mock_embed_deterministic() {
        let provider = MockEmbeddingProvider::new(16);
        let e1 = provider.embed("same text").await.unwrap();
        let e2 = provider.embed("same text").await.unwrap();
        assert_eq!(e1, e2);
        assert_ne!(e1, provider.embed("other text").await.unwrap());
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = normalize(vec![3.0, 4.0]).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_rejects_zero_and_nan() {
        assert!(normalize(vec![0.0, 0.0]).unwrap_err().is_embedding_unavailable());
        assert!(normalize(vec![1.0, f32::NAN]).unwrap_err().is_embedding_unavailable());
        assert!(normalize(vec![f32::INFINITY, 1.0]).is_err());
    }

    #[tokio::test]
    async fn test_adapter_normalizes_provider_output() {
        let adapter = EmbeddingAdapter::new(Arc::new(MockEmbeddingProvider::new(32)));
        let vectors = adapter
            .embed(&["Intro to Python", "Advanced Leadership", ""])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 3);
        for v in &vectors {
            assert_eq!(v.len(), 32);
            assert!((l2_norm(v) - 1.0).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn test_adapter_batches_preserve_order() {
        let unbatched = EmbeddingAdapter::new(Arc::new(MockEmbeddingProvider::new(8)));
        let batched = unbatched.clone().with_batch_size(2);
        let texts = ["a", "bb", "ccc", "dddd", "eeeee"];

        assert_eq!(
            unbatched.embed(&texts).await.unwrap(),
            batched.embed(&texts).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_adapter_empty_input() {
        let adapter = EmbeddingAdapter::new(Arc::new(FailingProvider));
        assert!(adapter.embed(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adapter_provider_failure_is_unavailable() {
        let adapter = EmbeddingAdapter::new(Arc::new(FailingProvider));
        let err = adapter.embed_one("query").await.unwrap_err();
        assert!(err.is_embedding_unavailable());
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_adapter_timeout_is_unavailable() {
        let adapter =
            EmbeddingAdapter::new(Arc::new(SlowProvider)).with_timeout(Duration::from_millis(20));
        let err = adapter.embed_one("query").await.unwrap_err();
        assert!(err.is_embedding_unavailable());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_adapter_rejects_wrong_dimension() {
        let adapter = fixed(vec![1.0, 0.0, 0.0], 4);
        let err = adapter.embed_one("query").await.unwrap_err();
        assert!(err.is_embedding_unavailable());
        assert!(err.to_string().contains("dimension 3"));
    }

    #[tokio::test]
    async fn test_adapter_rejects_non_finite() {
        let adapter = fixed(vec![1.0, f32::NAN], 2);
        assert!(adapter.embed_one("query").await.unwrap_err().is_embedding_unavailable());
    }

    #[test]
    fn test_adapter_model_id() {
        let adapter = EmbeddingAdapter::new(Arc::new(MockEmbeddingProvider::new(4)));
        assert_eq!(adapter.model_id(), "mock/mock");
        assert_eq!(adapter.dimension(), 4);
    }

    #[test]
    fn test_factory_known_providers() {
        let config = EmbeddingConfig::default();
        let provider = create_embedding_provider(&config).unwrap();
        assert_eq!(provider.name(), "hash");
        assert_eq!(provider.dimension(), 384);

        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            dimension: 8,
            ..Default::default()
        };
        assert_eq!(create_embedding_provider(&config).unwrap().name(), "mock");
    }

    #[test]
    fn test_factory_rejects_unknown_and_zero_dimension() {
        let unknown = EmbeddingConfig {
            provider: "word2vec".to_string(),
            ..Default::default()
        };
        let err = create_embedding_provider(&unknown).err().unwrap();
        assert!(err.to_string().contains("Unknown embedding provider"));

        let zero = EmbeddingConfig {
            dimension: 0,
            ..Default::default()
        };
        assert!(create_embedding_provider(&zero).is_err());
    }

    #[test]
    fn test_trait_object_safety() {
        fn _assert_object_safe(_: &dyn EmbeddingProvider) {}
    }
}
