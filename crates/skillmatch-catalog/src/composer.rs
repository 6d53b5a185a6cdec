//! Feature text composition for catalog records.

use crate::record::{CatalogRecord, format_price};
use skillmatch_vector::FeatureExtractor;

/// Composes the text embedded for a [`CatalogRecord`].
///
/// The text is `title provider domain duration price`, joined with single
/// spaces in that order. Index build and any later re-derivation must use
/// this same composer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureComposer;

impl FeatureComposer {
    /// Create a composer.
    pub fn new() -> Self {
        Self
    }

    /// Compose the feature text for `record`.
    pub fn compose(&self, record: &CatalogRecord) -> String {
        format!(
            "{} {} {} {} {}",
            record.title,
            record.provider,
            record.domain,
            record.duration,
            format_price(record.price)
        )
    }
}

impl FeatureExtractor<CatalogRecord> for FeatureComposer {
    fn feature_text(&self, record: &CatalogRecord) -> String {
        self.compose(record)
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_field_order() {
        let record = CatalogRecord::new("Intro to Python", "NASSCOM", "IT", "40 Hours", 1000.0);
        assert_eq!(
            FeatureComposer.compose(&record),
            "Intro to Python NASSCOM IT 40 Hours 1000"
        );
    }

    #[test]
    fn test_compose_missing_fields() {
        let record = CatalogRecord {
            title: "Intro to Python".to_string(),
            ..Default::default()
        };
        assert_eq!(FeatureComposer.compose(&record), "Intro to Python    0");
    }

    #[test]
    fn test_compose_fractional_price() {
        let record = CatalogRecord::new("A", "B", "C", "D", 1499.5);
        assert!(FeatureComposer.compose(&record).ends_with(" 1499.5"));
    }

    #[test]
    fn test_extractor_matches_compose() {
        let record = CatalogRecord::new("Advanced Leadership", "", "", "", 5000.0);
        let composer = FeatureComposer::new();
        let extractor: &dyn FeatureExtractor<CatalogRecord> = &composer;
        assert_eq!(extractor.feature_text(&record), composer.compose(&record));
        assert_eq!(extractor.name(), "catalog");
    }
}
