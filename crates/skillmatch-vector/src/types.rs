//! Common types for the vector search module.
//!
//! These types are used across all embedding providers and the index,
//! and are always available regardless of feature flags.

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Embedding configuration.
///
/// Controls provider selection, model identity, batching and the timeout
/// applied to every provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: "hash", "mock", "fastembed" or "http".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Embedding model name (e.g., "all-minilm-l6-v2").
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding dimension. Used by providers that cannot probe it.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Path to cache directory for embedding models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,

    /// Base URL of an OpenAI-compatible embeddings endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key sent as a bearer token to the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Timeout for a single provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Batch size for embedding operations.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_provider() -> String {
    "hash".to_string()
}

fn default_model() -> String {
    "all-minilm-l6-v2".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimension: default_dimension(),
            cache_path: None,
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}

// ============================================================================
// Search types
// ============================================================================

/// A raw hit from the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Row position in the index (and in the metadata table).
    pub position: usize,

    /// Squared Euclidean distance from the query vector.
    pub distance: f32,
}

/// A search hit paired with its metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<R> {
    /// The metadata row at the hit position.
    pub record: R,

    /// Cosine similarity derived from the distance (higher is more similar).
    pub score: f32,

    /// Squared Euclidean distance from the query vector.
    pub distance: f32,

    /// Row position in the index.
    pub position: usize,
}

// ============================================================================
// Index statistics
// ============================================================================

/// Statistics from a vector index build operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBuildStats {
    /// Number of documents indexed.
    pub documents_indexed: usize,

    /// Embedding dimension used.
    pub embedding_dimension: usize,

    /// Content hash for freshness checking.
    pub content_hash: String,

    /// Build duration in milliseconds.
    pub build_duration_ms: u64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_config_default() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "hash");
        assert_eq!(config.model, "all-minilm-l6-v2");
        assert_eq!(config.dimension, 384);
        assert!(config.cache_path.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn test_embedding_config_deserialization_with_defaults() {
        let json = r#"{"provider": "fastembed"}"#;
        let config: EmbeddingConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.provider, "fastembed");
        assert_eq!(config.model, "all-minilm-l6-v2");
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn test_embedding_config_skips_unset_secrets() {
        let json = serde_json::to_string(&EmbeddingConfig::default()).unwrap();
        assert!(!json.contains("api_key"));
        assert!(!json.contains("endpoint"));
    }

    #[test]
    fn test_search_result_serialization() {
        let result = SearchResult {
            record: "row".to_string(),
            score: 0.85,
            distance: 0.3,
            position: 4,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"record\":\"row\""));
        assert!(json.contains("0.85"));
    }

    #[test]
    fn test_index_stats_serialization() {
        let stats = IndexBuildStats {
            documents_indexed: 100,
            embedding_dimension: 384,
            content_hash: "abc123".to_string(),
            build_duration_ms: 1500,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("100"));
        assert!(json.contains("384"));
        assert!(json.contains("abc123"));
    }
}
