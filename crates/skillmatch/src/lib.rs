//! SkillMatch: semantic course recommendations.
//!
//! Matches free-text queries against a training catalog by embedding
//! similarity and returns a ranked top-K list with cosine scores.
//!
//! This crate is the facade over the workspace:
//!
//! - [`skillmatch_core`]: shared error type
//! - [`skillmatch_catalog`]: catalog records, price parsing, dataset loading
//! - [`skillmatch_vector`]: embedding, exact index, persistence, search
//!
//! # Example
//!
//! ```rust,ignore
//! use skillmatch::{CatalogSource, EmbeddingConfig, RebuildPolicy, RecommenderFacade};
//!
//! let facade = RecommenderFacade::from_config(&EmbeddingConfig::default(), "course_index")?;
//! facade
//!     .ensure_index(&CatalogSource::from_csv_path("courses.csv"), RebuildPolicy::IfMissing)
//!     .await?;
//!
//! for rec in facade.recommend("python programming", 5).await?.results() {
//!     println!("{} ({:.4})", rec.record.title, rec.score);
//! }
//! ```

pub mod export;
pub mod recommender;

pub use export::{ResultSummary, summarize, to_csv_string, write_csv};
pub use recommender::{
    BuildReport, EnsureOutcome, IndexStatus, RebuildPolicy, RecommendationResult,
    Recommendations, RecommenderFacade,
};

// Re-exports from the member crates
pub use skillmatch_catalog::{
    CatalogRecord, CatalogSource, FeatureComposer, LoadReport, PriceStatus, parse_price,
};
pub use skillmatch_core::{Error, Result};
pub use skillmatch_vector::{
    EmbeddingAdapter, EmbeddingConfig, EmbeddingProvider, HashEmbeddingProvider, IndexBuildStats,
    IndexManifest, IndexStore, MockEmbeddingProvider,
};

pub use skillmatch_catalog as catalog;
pub use skillmatch_vector as vector;
