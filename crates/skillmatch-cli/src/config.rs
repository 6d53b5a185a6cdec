//! Configuration for the SkillMatch CLI.
//!
//! Provides the [`SkillmatchConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `SKILLMATCH_CONFIG` environment variable
//! 3. XDG default: `~/.config/skillmatch/config.toml`
//! 4. Built-in defaults
//!
//! `SKILLMATCH_<SECTION>_<KEY>` variables overlay the file, e.g.
//! `SKILLMATCH_EMBEDDING_PROVIDER=fastembed`.

use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};
use skillmatch::{CatalogSource, EmbeddingConfig, Error, RecommenderFacade, Result};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillmatchConfig {
    /// Course dataset.
    pub catalog: CatalogConfig,

    /// Index location and query defaults.
    pub index: IndexConfig,

    /// Embedding provider.
    pub embedding: EmbeddingConfig,
}

/// Course dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the CSV dataset.
    pub source_path: String,
}

/// Index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the index artifacts.
    pub path: String,

    /// Recommendations returned when `-k` is not given.
    pub default_limit: usize,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_path: "FutureSkills Prime_data.csv".to_string(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: "course_index".to_string(),
            default_limit: 10,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl SkillmatchConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("SKILLMATCH");
        env_opts.add_section("catalog");
        env_opts.add_section("index");
        env_opts.add_section("embedding");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("SKILLMATCH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("skillmatch").join("config.toml"))
    }

    /// The configured dataset.
    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::from_csv_path(&self.catalog.source_path)
    }

    /// Build a recommender facade from this configuration.
    pub fn facade(&self) -> Result<RecommenderFacade> {
        RecommenderFacade::from_config(&self.embedding, &self.index.path)
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `SKILLMATCH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "SKILLMATCH", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
