//! FeatureExtractor trait for domain-specific text composition.
//!
//! The extractor separates text composition from embedding. Domains decide
//! what text represents a record; the embedding adapter then turns it into
//! a vector. The same extractor must be used when building an index and
//! when re-deriving feature text later, or positions and vectors drift
//! apart silently.

/// Trait for composing the text embedded for a record of type `R`.
///
/// Implementations must be pure: the same record always yields the same
/// text.
pub trait FeatureExtractor<R>: Send + Sync {
    /// Compose the feature text for `record`.
    fn feature_text(&self, record: &R) -> String;

    /// Returns the name of this extractor for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<R, F> FeatureExtractor<R> for F
where
    F: Fn(&R) -> String + Send + Sync,
{
    fn feature_text(&self, record: &R) -> String {
        self(record)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
