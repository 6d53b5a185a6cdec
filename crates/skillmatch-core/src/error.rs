//! Error types for SkillMatch operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all SkillMatch crates. Uses `thiserror` for derive macros.
//!
//! The first five variants are the recommender's own failure taxonomy; the
//! remaining ones cover I/O, configuration and parsing.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in SkillMatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The embedding service could not be reached, timed out, or returned
    /// malformed output.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Persisted index artifacts are absent.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Persisted index artifacts disagree with each other.
    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),

    /// A zero-entry index was queried with `k > 0`.
    #[error("Index is empty")]
    EmptyIndex,

    /// The recommender has no loaded index to serve.
    #[error("Recommender not initialized")]
    NotInitialized,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create an embedding-unavailable error.
    pub fn embedding_unavailable(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    /// Create an index-not-found error.
    pub fn index_not_found(msg: impl Into<String>) -> Self {
        Self::IndexNotFound(msg.into())
    }

    /// Create an index-corrupt error.
    pub fn index_corrupt(msg: impl Into<String>) -> Self {
        Self::IndexCorrupt(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Wrap an I/O error together with the offending path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is an [`Error::IndexNotFound`].
    pub fn is_index_not_found(&self) -> bool {
        matches!(self, Self::IndexNotFound(_))
    }

    /// Whether this is an [`Error::IndexCorrupt`].
    pub fn is_index_corrupt(&self) -> bool {
        matches!(self, Self::IndexCorrupt(_))
    }

    /// Whether this is an [`Error::EmbeddingUnavailable`].
    pub fn is_embedding_unavailable(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias using SkillMatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_variant() {
        assert!(Error::index_not_found("x").is_index_not_found());
        assert!(Error::index_corrupt("x").is_index_corrupt());
        assert!(Error::embedding_unavailable("x").is_embedding_unavailable());
        assert!(!Error::config("x").is_index_corrupt());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::index_corrupt("3 vectors, 2 rows").to_string(),
            "Index corrupt: 3 vectors, 2 rows"
        );
        assert_eq!(Error::EmptyIndex.to_string(), "Index is empty");
        assert_eq!(
            Error::NotInitialized.to_string(),
            "Recommender not initialized"
        );
    }

    #[test]
    fn test_io_with_path_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_path(io, "/data/vectors.json");
        assert!(err.to_string().contains("/data/vectors.json"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
