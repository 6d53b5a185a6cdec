//! Vector index builder.
//!
//! Orchestrates the build pipeline:
//! 1. Compose one feature text per record through a [`FeatureExtractor`]
//! 2. Hash the texts together with the model identity
//! 3. Embed every text through the [`EmbeddingAdapter`]
//! 4. Assemble the [`FlatIndex`] and pair it with the records
//!
//! Nothing is persisted here; the caller decides when the finished
//! [`IndexArtifactPair`] is saved and published.

use crate::embedding::EmbeddingAdapter;
use crate::extractor::FeatureExtractor;
use crate::index::FlatIndex;
use crate::persistence::{IndexArtifactPair, IndexManifest, compute_content_hash};
use crate::types::IndexBuildStats;
use skillmatch_core::Result;
use std::time::Instant;

/// Builds [`IndexArtifactPair`]s from records.
pub struct VectorIndexBuilder<'a, R> {
    adapter: &'a EmbeddingAdapter,
    extractor: &'a dyn FeatureExtractor<R>,
}

impl<'a, R> VectorIndexBuilder<'a, R> {
    /// Create a builder embedding through `adapter` the text `extractor` composes.
    pub fn new(adapter: &'a EmbeddingAdapter, extractor: &'a dyn FeatureExtractor<R>) -> Self {
        Self { adapter, extractor }
    }

    /// Feature texts for `records`, in order.
    pub fn feature_texts(&self, records: &[R]) -> Vec<String> {
        records
            .iter()
            .map(|record| self.extractor.feature_text(record))
            .collect()
    }

    /// Content hash `records` would be built under with the current model.
    pub fn content_hash(&self, records: &[R]) -> String {
        compute_content_hash(&self.model_key(), &self.feature_texts(records))
    }

    /// Model identity plus output dimension; the same model id can be
    /// configured at several dimensions.
    fn model_key(&self) -> String {
        format!("{}@{}", self.adapter.model_id(), self.adapter.dimension())
    }

    /// Embed `records` and pair the resulting index with them.
    ///
    /// Either every record is embedded and the pair is returned, or the
    /// first failure is returned and nothing is produced.
    pub async fn build(&self, records: Vec<R>) -> Result<(IndexArtifactPair<R>, IndexBuildStats)> {
        let start = Instant::now();
        log::info!(
            "Building vector index for {} records with {} ({})",
            records.len(),
            self.adapter.model_id(),
            self.extractor.name()
        );

        let texts = self.feature_texts(&records);
        let content_hash = compute_content_hash(&self.model_key(), &texts);

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.adapter.embed(&refs).await?;

        let dimension = self.adapter.dimension();
        let index = FlatIndex::build(dimension, vectors)?;

        let manifest = IndexManifest {
            content_hash: content_hash.clone(),
            document_count: records.len(),
            embedding_dimension: dimension,
            built_at: chrono::Utc::now(),
            provider: self.adapter.provider_name().to_string(),
            model: self.adapter.model().to_string(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        let pair = IndexArtifactPair::new(index, records, Some(manifest))?;

        let stats = IndexBuildStats {
            documents_indexed: pair.len(),
            embedding_dimension: dimension,
            content_hash,
            build_duration_ms: start.elapsed().as_millis() as u64,
        };
        log::info!(
            "Built vector index: {} documents in {}ms",
            stats.documents_indexed,
            stats.build_duration_ms
        );

        Ok((pair, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingProvider, MockEmbeddingProvider, l2_norm};
    use async_trait::async_trait;
    use skillmatch_core::Error;
    use std::sync::Arc;

    fn title_of(s: &String) -> String {
        s.clone()
    }

    fn mock_adapter() -> EmbeddingAdapter {
        EmbeddingAdapter::new(Arc::new(MockEmbeddingProvider::new(16)))
    }

    fn titles(adapter: &EmbeddingAdapter) -> VectorIndexBuilder<'_, String> {
        VectorIndexBuilder::new(adapter, &title_of)
    }

    #[tokio::test]
    async fn test_build_aligns_rows() {
        let adapter = mock_adapter();
        let builder = titles(&adapter);
        let records = vec!["Intro to Python".to_string(), "Advanced Leadership".to_string()];

        let (pair, stats) = builder.build(records.clone()).await.unwrap();

        assert_eq!(pair.len(), 2);
        assert_eq!(pair.records(), records.as_slice());
        assert_eq!(pair.index().dimension(), 16);
        for vector in pair.index().iter() {
            assert!((l2_norm(vector) - 1.0).abs() < 1e-5);
        }

        let manifest = pair.manifest().unwrap();
        assert_eq!(manifest.document_count, 2);
        assert_eq!(manifest.provider, "mock");
        assert_eq!(manifest.content_hash, stats.content_hash);
        assert_eq!(stats.documents_indexed, 2);
        assert_eq!(stats.embedding_dimension, 16);
    }

    #[tokio::test]
    async fn test_build_empty() {
        let adapter = mock_adapter();
        let builder = titles(&adapter);
        let (pair, stats) = builder.build(Vec::new()).await.unwrap();
        assert!(pair.is_empty());
        assert_eq!(stats.documents_indexed, 0);
    }

    #[tokio::test]
    async fn test_build_deterministic() {
        let adapter = mock_adapter();
        let builder = titles(&adapter);
        let records = vec!["a".to_string(), "b".to_string()];

        let (first, _) = builder.build(records.clone()).await.unwrap();
        let (second, _) = builder.build(records.clone()).await.unwrap();
        assert_eq!(first.index(), second.index());
        assert_eq!(builder.content_hash(&records), first.manifest().unwrap().content_hash);
    }

    #[test]
    fn test_content_hash_depends_on_dimension() {
        let narrow = EmbeddingAdapter::new(Arc::new(MockEmbeddingProvider::new(8)));
        let wide = mock_adapter();
        let records = vec!["a".to_string(), "b".to_string()];

        assert_eq!(narrow.model_id(), wide.model_id());
        assert_ne!(
            titles(&narrow).content_hash(&records),
            titles(&wide).content_hash(&records)
        );
    }

    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::operation("model crashed"))
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_build_fails_whole() {
        let adapter = EmbeddingAdapter::new(Arc::new(BrokenProvider));
        let builder = titles(&adapter);
        let err = builder.build(vec!["x".to_string()]).await.unwrap_err();
        assert!(err.is_embedding_unavailable());
    }
}
