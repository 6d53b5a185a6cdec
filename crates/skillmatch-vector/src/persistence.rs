//! Persistence for index/metadata pairs.
//!
//! An index is stored as a directory holding three artifacts:
//!
//! | File | Contents |
//! |------|----------|
//! | `vectors.json` | dimension, row count, and row-major vector data |
//! | `metadata.csv` | one metadata row per vector, same order |
//! | `manifest.json` | content hash, model identity, build time |
//!
//! The vectors and the metadata table are only ever handled together as an
//! [`IndexArtifactPair`]. Saving writes a complete sibling staging directory
//! and renames it into place, so a reader sees the old pair or the new one
//! and never a mix. Loading re-checks that the two halves line up.

use crate::embedding::l2_norm;
use crate::index::FlatIndex;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skillmatch_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Serialized vector artifact.
pub const VECTORS_FILE: &str = "vectors.json";
/// Serialized metadata table.
pub const METADATA_FILE: &str = "metadata.csv";
/// Build manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Allowed drift from unit norm for a persisted vector.
const NORM_TOLERANCE: f32 = 1e-3;

// ============================================================================
// Manifest
// ============================================================================

/// Metadata stored alongside an index for freshness and model checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Content hash at build time.
    pub content_hash: String,

    /// Number of documents indexed.
    pub document_count: usize,

    /// Embedding dimension.
    pub embedding_dimension: usize,

    /// Build timestamp.
    pub built_at: DateTime<Utc>,

    /// Embedding provider name.
    pub provider: String,

    /// Model name used for embeddings.
    pub model: String,

    /// Version of the crate that built the index.
    pub builder_version: String,
}

/// Hash the model identity and every feature text, in order.
///
/// Any change to the corpus, its order, or the model changes the hash.
pub fn compute_content_hash<S: AsRef<str>>(model_id: &str, texts: &[S]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(model_id.as_bytes());
    for text in texts {
        let text = text.as_ref();
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Check if an existing index is fresh.
///
/// Returns `true` if the manifest exists and its content hash matches.
pub fn is_index_fresh(manifest_path: &Path, current_hash: &str) -> bool {
    match load_manifest(manifest_path) {
        Ok(manifest) => manifest.content_hash == current_hash,
        Err(_) => false,
    }
}

/// Save a manifest to a JSON file.
pub fn save_manifest(manifest_path: &Path, manifest: &IndexManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(manifest_path, json).map_err(|e| Error::io_with_path(e, manifest_path))?;
    Ok(())
}

/// Load a manifest from a JSON file.
pub fn load_manifest(manifest_path: &Path) -> Result<IndexManifest> {
    let json = std::fs::read_to_string(manifest_path)
        .map_err(|e| Error::io_with_path(e, manifest_path))?;
    let manifest: IndexManifest = serde_json::from_str(&json)?;
    Ok(manifest)
}

// ============================================================================
// Artifact pair
// ============================================================================

/// A vector index and its metadata table, aligned by row position.
///
/// Construction checks the alignment, so holding a pair means row `i` of
/// the index describes `records()[i]`.
#[derive(Debug, Clone)]
pub struct IndexArtifactPair<R> {
    index: FlatIndex,
    records: Vec<R>,
    manifest: Option<IndexManifest>,
}

impl<R> IndexArtifactPair<R> {
    /// Pair an index with its records.
    ///
    /// Fails with [`Error::IndexCorrupt`] when the row counts disagree or
    /// the manifest describes a different index.
    pub fn new(index: FlatIndex, records: Vec<R>, manifest: Option<IndexManifest>) -> Result<Self> {
        if index.len() != records.len() {
            return Err(Error::index_corrupt(format!(
                "index has {} vectors but metadata has {} rows",
                index.len(),
                records.len()
            )));
        }

        if let Some(m) = &manifest {
            if m.document_count != records.len() {
                return Err(Error::index_corrupt(format!(
                    "manifest lists {} documents but {} are stored",
                    m.document_count,
                    records.len()
                )));
            }
            if !index.is_empty() && m.embedding_dimension != index.dimension() {
                return Err(Error::index_corrupt(format!(
                    "manifest dimension {} does not match index dimension {}",
                    m.embedding_dimension,
                    index.dimension()
                )));
            }
        }

        Ok(Self {
            index,
            records,
            manifest,
        })
    }

    /// The vector index.
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// The metadata table.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The build manifest, when one was recorded.
    pub fn manifest(&self) -> Option<&IndexManifest> {
        self.manifest.as_ref()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the pair holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Serialize)]
struct VectorFileRef<'a> {
    dimension: usize,
    count: usize,
    data: &'a [f32],
}

#[derive(Deserialize)]
struct VectorFile {
    dimension: usize,
    count: usize,
    data: Vec<f32>,
}

/// Saves and loads [`IndexArtifactPair`]s under one directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    location: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at `location` (a directory, created on save).
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// The artifact directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.location.join(MANIFEST_FILE)
    }

    /// Whether both the vector and the metadata artifact are present.
    pub fn exists(&self) -> bool {
        self.location.join(VECTORS_FILE).is_file() && self.location.join(METADATA_FILE).is_file()
    }

    /// Whether the stored index was built from content hashing to `current_hash`.
    pub fn is_fresh(&self, current_hash: &str) -> bool {
        self.exists() && is_index_fresh(&self.manifest_path(), current_hash)
    }

    /// Persist `pair`, replacing any pair already stored here.
    pub fn save<R: Serialize>(&self, pair: &IndexArtifactPair<R>) -> Result<()> {
        if let Some(parent) = self.location.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
            }
        }

        let staging = self.sibling("staging")?;
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| Error::io_with_path(e, &staging))?;
        }
        std::fs::create_dir_all(&staging).map_err(|e| Error::io_with_path(e, &staging))?;

        write_vectors(&staging.join(VECTORS_FILE), pair.index())?;
        write_records(&staging.join(METADATA_FILE), pair.records())?;
        if let Some(manifest) = pair.manifest() {
            save_manifest(&staging.join(MANIFEST_FILE), manifest)?;
        }

        self.publish(&staging)?;
        log::info!(
            "Saved index with {} rows to {}",
            pair.len(),
            self.location.display()
        );
        Ok(())
    }

    /// Load the stored pair.
    ///
    /// Fails with [`Error::IndexNotFound`] when either artifact is missing
    /// and with [`Error::IndexCorrupt`] when they cannot be read or do not
    /// line up.
    pub fn load<R: DeserializeOwned>(&self) -> Result<IndexArtifactPair<R>> {
        let vectors_path = self.location.join(VECTORS_FILE);
        let metadata_path = self.location.join(METADATA_FILE);
        for path in [&vectors_path, &metadata_path] {
            if !path.is_file() {
                return Err(Error::index_not_found(format!(
                    "missing {}",
                    path.display()
                )));
            }
        }

        let index = read_vectors(&vectors_path)?;
        let records = read_records(&metadata_path)?;

        let manifest_path = self.manifest_path();
        let manifest = if manifest_path.is_file() {
            Some(load_manifest(&manifest_path).map_err(|e| {
                Error::index_corrupt(format!("{}: {e}", manifest_path.display()))
            })?)
        } else {
            log::warn!(
                "No manifest at {}; index freshness is unknown",
                manifest_path.display()
            );
            None
        };

        let pair = IndexArtifactPair::new(index, records, manifest)?;
        log::info!(
            "Loaded index with {} rows from {}",
            pair.len(),
            self.location.display()
        );
        Ok(pair)
    }

    /// Swap the staging directory into place.
    fn publish(&self, staging: &Path) -> Result<()> {
        if !self.location.exists() {
            return std::fs::rename(staging, &self.location)
                .map_err(|e| Error::io_with_path(e, &self.location));
        }

        let retired = self.sibling("retired")?;
        if retired.exists() {
            std::fs::remove_dir_all(&retired).map_err(|e| Error::io_with_path(e, &retired))?;
        }
        std::fs::rename(&self.location, &retired)
            .map_err(|e| Error::io_with_path(e, &self.location))?;

        if let Err(e) = std::fs::rename(staging, &self.location) {
            // Restore the previous pair rather than leave nothing behind.
            if let Err(restore) = std::fs::rename(&retired, &self.location) {
                log::error!(
                    "Failed to restore {} after publish error: {restore}",
                    self.location.display()
                );
            }
            return Err(Error::io_with_path(e, &self.location));
        }

        if let Err(e) = std::fs::remove_dir_all(&retired) {
            log::warn!("Could not remove {}: {e}", retired.display());
        }
        Ok(())
    }

    fn sibling(&self, suffix: &str) -> Result<PathBuf> {
        let name = self.location.file_name().ok_or_else(|| {
            Error::config(format!(
                "index location {} must name a directory",
                self.location.display()
            ))
        })?;
        let mut name = name.to_os_string();
        name.push(format!(".{suffix}"));
        Ok(self.location.with_file_name(name))
    }
}

fn write_vectors(path: &Path, index: &FlatIndex) -> Result<()> {
    let file = VectorFileRef {
        dimension: index.dimension(),
        count: index.len(),
        data: index.data(),
    };
    let json = serde_json::to_string(&file)?;
    std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))
}

fn read_vectors(path: &Path) -> Result<FlatIndex> {
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let file: VectorFile = serde_json::from_str(&json)
        .map_err(|e| Error::index_corrupt(format!("{}: {e}", path.display())))?;

    let index = FlatIndex::from_parts(file.dimension, file.data)?;
    if index.len() != file.count {
        return Err(Error::index_corrupt(format!(
            "{} declares {} vectors but holds {}",
            path.display(),
            file.count,
            index.len()
        )));
    }

    for (position, vector) in index.iter().enumerate() {
        let norm = l2_norm(vector);
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(Error::index_corrupt(format!(
                "vector {position} has norm {norm}, expected 1"
            )));
        }
    }

    Ok(index)
}

fn write_records<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::operation(format!("{}: {e}", path.display())))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::Serialization(format!("{}: {e}", path.display())))?;
    }
    writer.flush().map_err(|e| Error::io_with_path(e, path))
}

fn read_records<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::index_corrupt(format!("{}: {e}", path.display())))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| Error::index_corrupt(format!("{}: {e}", path.display()))))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
