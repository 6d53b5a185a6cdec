//! Vector similarity search for SkillMatch.
//!
//! This crate turns records into unit-length embedding vectors, indexes
//! them in an exact flat index, persists the index together with its
//! metadata rows, and answers top-K similarity queries.
//!
//! # Features
//!
//! - `vector-fastembed`: Enable local embedding generation via fastembed
//! - `embedding-http`: Enable OpenAI-compatible remote embedding endpoints
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    skillmatch-vector                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── HashEmbeddingProvider (default, offline)               │
//! │  ├── MockEmbeddingProvider (always available)               │
//! │  ├── FastEmbedProvider (feature: vector-fastembed)          │
//! │  └── HttpEmbeddingProvider (feature: embedding-http)        │
//! │  EmbeddingAdapter (batching, timeout, normalization)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FeatureExtractor trait (domain text composition)           │
//! │  VectorIndexBuilder (embed + index + manifest)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FlatIndex (exact squared-L2 k-NN)                          │
//! │  SearchEngine (query embed, cosine scores, row lookup)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexArtifactPair + IndexStore (atomic save, checked load) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use skillmatch_vector::{EmbeddingAdapter, HashEmbeddingProvider, SearchEngine, VectorIndexBuilder};
//! use std::sync::Arc;
//!
//! let adapter = EmbeddingAdapter::new(Arc::new(HashEmbeddingProvider::new(384)));
//! let extractor = |title: &String| title.clone();
//! let builder = VectorIndexBuilder::new(&adapter, &extractor);
//!
//! let (pair, _stats) = builder.build(titles).await?;
//! let results = SearchEngine::for_pair(&adapter, &pair)
//!     .search("python programming", 5)
//!     .await?;
//! for result in results {
//!     println!("{}: {:.3}", result.record, result.score);
//! }
//! ```

// Core modules (always available)
pub mod embedding;
pub mod hash_embedder;
pub mod types;

// Index, build and search
pub mod builder;
pub mod extractor;
pub mod index;
pub mod search;

// Persistence
pub mod persistence;

// Feature-gated providers
#[cfg(feature = "vector-fastembed")]
pub mod fastembed;

#[cfg(feature = "embedding-http")]
pub mod http;

// Re-exports: core types
pub use types::{EmbeddingConfig, IndexBuildStats, SearchHit, SearchResult};

// Re-exports: embedding
pub use embedding::{
    EmbeddingAdapter, EmbeddingProvider, MockEmbeddingProvider, create_embedding_provider,
    l2_norm, normalize,
};
pub use hash_embedder::HashEmbeddingProvider;

// Re-exports: index, build and search
pub use builder::VectorIndexBuilder;
pub use extractor::FeatureExtractor;
pub use index::{FlatIndex, squared_l2};
pub use search::{SearchEngine, distance_to_cosine};

// Re-exports: persistence
pub use persistence::{
    IndexArtifactPair, IndexManifest, IndexStore, MANIFEST_FILE, METADATA_FILE, VECTORS_FILE,
    compute_content_hash, is_index_fresh, load_manifest, save_manifest,
};

// Re-exports: feature-gated
#[cfg(feature = "vector-fastembed")]
pub use fastembed::FastEmbedProvider;

#[cfg(feature = "embedding-http")]
pub use http::HttpEmbeddingProvider;
