//! Exact flat vector index.
//!
//! Vectors are stored contiguously, row-major, one row per catalog record.
//! Search is brute force over every row, which keeps scores exactly
//! reproducible and is fast enough for catalogs in the tens of thousands.

use crate::types::SearchHit;
use skillmatch_core::{Error, Result};

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exact nearest-neighbor index over fixed-dimension vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from `vectors`, all of which must have `dimension`
    /// components. Row `i` of the index is `vectors[i]`.
    pub fn build(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if dimension == 0 && !vectors.is_empty() {
            return Err(Error::invalid_data("index dimension must be positive"));
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for (position, vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimension {
                return Err(Error::invalid_data(format!(
                    "vector {position} has dimension {}, expected {dimension}",
                    vector.len()
                )));
            }
            data.extend(vector);
        }

        Ok(Self { dimension, data })
    }

    /// Rebuild from the serialized parts, checking the data is whole rows.
    pub(crate) fn from_parts(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            if !data.is_empty() {
                return Err(Error::index_corrupt("zero dimension with non-empty data"));
            }
        } else if data.len() % dimension != 0 {
            return Err(Error::index_corrupt(format!(
                "{} values is not a whole number of {dimension}-dimensional rows",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    pub(crate) fn data(&self) -> &[f32] {
        &self.data
    }

    /// Vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Iterate over stored vectors in position order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on zero, and a zero-dimension index is empty anyway.
        self.data.chunks_exact(self.dimension.max(1))
    }

    /// The `k` nearest vectors to `query` by squared Euclidean distance.
    ///
    /// Results are ascending by distance with ties broken by ascending
    /// position, and hold `min(k, len)` entries. Fails with
    /// [`Error::EmptyIndex`] when the index is empty and `k > 0`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(Error::invalid_data(format!(
                "query has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .iter()
            .enumerate()
            .map(|(position, vector)| SearchHit {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);

        Ok(hits)
    }
}
