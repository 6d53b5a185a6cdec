//! Query-time search over an index and its metadata rows.

use crate::embedding::EmbeddingAdapter;
use crate::index::FlatIndex;
use crate::persistence::IndexArtifactPair;
use crate::types::SearchResult;
use skillmatch_core::{Error, Result};

/// Cosine similarity of two unit vectors from their squared distance.
///
/// For unit vectors `‖a - b‖² = 2 - 2·cos`, so `cos = 1 - d²/2`.
pub fn distance_to_cosine(squared_distance: f32) -> f32 {
    1.0 - squared_distance / 2.0
}

/// Embeds queries and ranks the rows of one index against them.
pub struct SearchEngine<'a, R> {
    adapter: &'a EmbeddingAdapter,
    index: &'a FlatIndex,
    records: &'a [R],
}

impl<'a, R: Clone> SearchEngine<'a, R> {
    /// Search `index`, mapping hit positions into `records`.
    pub fn new(adapter: &'a EmbeddingAdapter, index: &'a FlatIndex, records: &'a [R]) -> Self {
        Self {
            adapter,
            index,
            records,
        }
    }

    /// Search a validated pair.
    pub fn for_pair(adapter: &'a EmbeddingAdapter, pair: &'a IndexArtifactPair<R>) -> Self {
        Self::new(adapter, pair.index(), pair.records())
    }

    /// The `k` rows most similar to `query`, most similar first.
    ///
    /// Returns an empty list for `k = 0`, a query with no letters or digits,
    /// or an empty index, without calling the embedding provider.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult<R>>> {
        if k == 0 || !query.chars().any(char::is_alphanumeric) || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.adapter.embed_one(query).await?;
        if vector.len() != self.index.dimension() {
            return Err(Error::embedding_unavailable(format!(
                "query embedding has dimension {} but the index was built with {}",
                vector.len(),
                self.index.dimension()
            )));
        }

        let hits = match self.index.search(&vector, k) {
            Ok(hits) => hits,
            Err(Error::EmptyIndex) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(record) = self.records.get(hit.position) else {
                log::warn!(
                    "Index position {} has no metadata row ({} rows); skipping",
                    hit.position,
                    self.records.len()
                );
                continue;
            };
            results.push(SearchResult {
                record: record.clone(),
                score: distance_to_cosine(hit.distance),
                distance: hit.distance,
                position: hit.position,
            });
        }

        log::debug!("Query {query:?} matched {} of {} rows", results.len(), self.index.len());
        Ok(results)
    }
}
