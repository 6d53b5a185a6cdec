//! The recommender facade.
//!
//! [`RecommenderFacade`] owns everything a query needs: the embedding
//! adapter, the on-disk [`IndexStore`], and the pair currently being served.
//! Served pairs are immutable and shared as `Arc`s. A query clones the
//! current `Arc` and searches without holding any lock; a rebuild saves the
//! new pair first and only then swaps it in, so queries see the old pair or
//! the new one in full.

use serde::Serialize;
use skillmatch_catalog::{CatalogRecord, CatalogSource, FeatureComposer, LoadReport};
use skillmatch_core::{Error, Result};
use skillmatch_vector::{
    EmbeddingAdapter, EmbeddingConfig, IndexArtifactPair, IndexBuildStats, IndexManifest,
    IndexStore, SearchEngine, VectorIndexBuilder,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

type CatalogPair = IndexArtifactPair<CatalogRecord>;

// ============================================================================
// Result types
// ============================================================================

/// One recommended course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    /// The catalog row.
    pub record: CatalogRecord,

    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
}

/// Outcome of [`RecommenderFacade::recommend`].
///
/// "Not ready" and "nothing matched" are different answers; both expose an
/// empty [`results`](Self::results) so simple callers can ignore the
/// difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendations {
    /// Results in non-increasing score order.
    Ranked(Vec<RecommendationResult>),
    /// No index has been loaded or built.
    NotInitialized,
}

impl Recommendations {
    /// The ranked results; empty when not initialized.
    pub fn results(&self) -> &[RecommendationResult] {
        match self {
            Self::Ranked(results) => results,
            Self::NotInitialized => &[],
        }
    }

    /// Consume into the ranked results.
    pub fn into_results(self) -> Vec<RecommendationResult> {
        match self {
            Self::Ranked(results) => results,
            Self::NotInitialized => Vec::new(),
        }
    }

    /// Whether an index was available to answer the query.
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results().len()
    }

    /// Whether there are no results.
    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }
}

/// Result of building an index from a dataset source.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Index build statistics.
    pub stats: IndexBuildStats,

    /// Dataset load summary.
    pub load: LoadReport,
}

/// When [`RecommenderFacade::ensure_index`] rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildPolicy {
    /// Build only when no index is stored.
    #[default]
    IfMissing,
    /// Build when no index is stored or the dataset or model changed.
    IfStale,
    /// Always build.
    Always,
}

/// What [`RecommenderFacade::ensure_index`] did.
#[derive(Debug, Clone)]
pub enum EnsureOutcome {
    /// The stored index was loaded.
    Loaded {
        /// Rows in the loaded index.
        documents: usize,
    },
    /// A new index was built, saved and loaded.
    Built(BuildReport),
}

/// Snapshot of the facade's state.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    /// Whether queries can be answered with results.
    pub ready: bool,

    /// Rows in the served index.
    pub documents: usize,

    /// Dimension of the served index.
    pub dimension: Option<usize>,

    /// Index location on disk.
    pub location: PathBuf,

    /// Whether artifacts exist on disk.
    pub stored: bool,

    /// Configured embedding model, as `provider/model`.
    pub model_id: String,

    /// Manifest of the served index.
    pub manifest: Option<IndexManifest>,
}

// ============================================================================
// Facade
// ============================================================================

/// Course recommender over a persisted vector index.
pub struct RecommenderFacade {
    adapter: EmbeddingAdapter,
    store: IndexStore,
    composer: FeatureComposer,
    served: RwLock<Option<Arc<CatalogPair>>>,
    rebuild: tokio::sync::Mutex<()>,
}

impl RecommenderFacade {
    /// Create a facade with nothing served yet.
    pub fn new(adapter: EmbeddingAdapter, store: IndexStore) -> Self {
        Self {
            adapter,
            store,
            composer: FeatureComposer::new(),
            served: RwLock::new(None),
            rebuild: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a facade from embedding configuration and an index location.
    pub fn from_config(config: &EmbeddingConfig, index_path: impl Into<PathBuf>) -> Result<Self> {
        let adapter = EmbeddingAdapter::from_config(config)?;
        Ok(Self::new(adapter, IndexStore::new(index_path)))
    }

    /// The embedding adapter.
    pub fn adapter(&self) -> &EmbeddingAdapter {
        &self.adapter
    }

    /// The index location.
    pub fn index_path(&self) -> &Path {
        self.store.location()
    }

    /// Whether a non-empty index is loaded.
    pub fn is_ready(&self) -> bool {
        self.current().is_some_and(|pair| !pair.is_empty())
    }

    /// Recommend up to `k` courses for `query`.
    ///
    /// Returns [`Recommendations::NotInitialized`] only when no pair has been
    /// loaded or built. A loaded pair with no rows answers
    /// `Ranked(vec![])` even though [`is_ready`](Self::is_ready) is false.
    /// Embedding failures are returned as errors, never as empty results.
    pub async fn recommend(&self, query: &str, k: usize) -> Result<Recommendations> {
        let Some(pair) = self.current() else {
            log::warn!("Recommendation requested before an index was loaded");
            return Ok(Recommendations::NotInitialized);
        };

        let hits = SearchEngine::for_pair(&self.adapter, &*pair)
            .search(query, k)
            .await?;

        let results = hits
            .into_iter()
            .map(|hit| RecommendationResult {
                record: hit.record,
                score: hit.score,
            })
            .collect();
        Ok(Recommendations::Ranked(results))
    }

    /// Build an index from `records`, save it, and serve it.
    ///
    /// All or nothing: on any failure the stored and served index are the
    /// ones from before the call.
    pub async fn build_index(&self, records: Vec<CatalogRecord>) -> Result<IndexBuildStats> {
        let _guard = self.rebuild.lock().await;
        self.rebuild_locked(records).await
    }

    /// Load the dataset at `source` and build from it.
    pub async fn build_from_source(&self, source: &CatalogSource) -> Result<BuildReport> {
        let _guard = self.rebuild.lock().await;
        self.build_from_source_locked(source).await
    }

    /// Load the stored index and serve it. Returns the number of rows.
    pub fn load(&self) -> Result<usize> {
        let pair: CatalogPair = self.store.load()?;
        self.check_model(&pair);
        let documents = pair.len();
        self.publish(pair);
        Ok(documents)
    }

    /// Make sure an index is served, building from `source` per `policy`.
    ///
    /// A stored index that fails to load is an error under
    /// [`RebuildPolicy::IfMissing`]; it is never silently replaced. Under
    /// [`RebuildPolicy::IfStale`] a corrupt index is rebuilt from `source`.
    pub async fn ensure_index(
        &self,
        source: &CatalogSource,
        policy: RebuildPolicy,
    ) -> Result<EnsureOutcome> {
        let _guard = self.rebuild.lock().await;

        let rebuild = match policy {
            RebuildPolicy::Always => true,
            RebuildPolicy::IfMissing => !self.store.exists(),
            RebuildPolicy::IfStale => {
                let dataset = source.clone();
                let store = self.store.clone();
                let loaded = run_blocking(move || dataset.load()).await?;
                let hash = self.content_hash(&loaded.records);
                !run_blocking(move || Ok(store.is_fresh(&hash))).await?
            }
        };

        if rebuild {
            log::info!(
                "Building index at {} from {}",
                self.store.location().display(),
                source.path().display()
            );
            return Ok(EnsureOutcome::Built(
                self.build_from_source_locked(source).await?,
            ));
        }

        match self.load_off_thread().await {
            Ok(documents) => Ok(EnsureOutcome::Loaded { documents }),
            Err(e) if policy == RebuildPolicy::IfStale && e.is_index_corrupt() => {
                log::warn!(
                    "Index at {} is corrupt ({e}); rebuilding from {}",
                    self.store.location().display(),
                    source.path().display()
                );
                Ok(EnsureOutcome::Built(
                    self.build_from_source_locked(source).await?,
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the stored index matches the dataset at `source` and the
    /// configured model.
    pub fn is_fresh(&self, source: &CatalogSource) -> Result<bool> {
        self.stored_is_fresh(source)
    }

    /// Snapshot of the facade's state.
    pub fn stats(&self) -> IndexStatus {
        let served = self.current();
        IndexStatus {
            ready: served.as_ref().is_some_and(|pair| !pair.is_empty()),
            documents: served.as_ref().map_or(0, |pair| pair.len()),
            dimension: served.as_ref().map(|pair| pair.index().dimension()),
            location: self.store.location().to_path_buf(),
            stored: self.store.exists(),
            model_id: self.adapter.model_id(),
            manifest: served.and_then(|pair| pair.manifest().cloned()),
        }
    }

    // ------------------------------------------------------------------------

    async fn rebuild_locked(&self, records: Vec<CatalogRecord>) -> Result<IndexBuildStats> {
        let builder = VectorIndexBuilder::<CatalogRecord>::new(&self.adapter, &self.composer);
        let (pair, stats) = builder.build(records).await?;
        let store = self.store.clone();
        let pair = run_blocking(move || store.save(&pair).map(|()| pair)).await?;
        self.publish(pair);
        Ok(stats)
    }

    async fn build_from_source_locked(&self, source: &CatalogSource) -> Result<BuildReport> {
        let source = source.clone();
        let loaded = run_blocking(move || source.load()).await?;
        let stats = self.rebuild_locked(loaded.records).await?;
        Ok(BuildReport {
            stats,
            load: loaded.report,
        })
    }

    async fn load_off_thread(&self) -> Result<usize> {
        let store = self.store.clone();
        let pair: CatalogPair = run_blocking(move || store.load()).await?;
        self.check_model(&pair);
        let documents = pair.len();
        self.publish(pair);
        Ok(documents)
    }

    fn stored_is_fresh(&self, source: &CatalogSource) -> Result<bool> {
        if !self.store.exists() {
            return Ok(false);
        }
        let loaded = source.load()?;
        Ok(self.store.is_fresh(&self.content_hash(&loaded.records)))
    }

    fn content_hash(&self, records: &[CatalogRecord]) -> String {
        VectorIndexBuilder::<CatalogRecord>::new(&self.adapter, &self.composer).content_hash(records)
    }

    fn current(&self) -> Option<Arc<CatalogPair>> {
        self.served
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, pair: CatalogPair) {
        let mut served = self.served.write().unwrap_or_else(PoisonError::into_inner);
        *served = Some(Arc::new(pair));
    }

    fn check_model(&self, pair: &CatalogPair) {
        let Some(manifest) = pair.manifest() else {
            return;
        };
        if manifest.embedding_dimension != self.adapter.dimension() {
            log::warn!(
                "Index at {} holds {}-dimensional vectors but {} produces {}; rebuild with `skillmatch index --force`",
                self.store.location().display(),
                manifest.embedding_dimension,
                self.adapter.model_id(),
                self.adapter.dimension()
            );
        }
        if manifest.provider != self.adapter.provider_name() || manifest.model != self.adapter.model()
        {
            log::warn!(
                "Index at {} was built with {}/{} but queries use {}; rebuild with `skillmatch index --force`",
                self.store.location().display(),
                manifest.provider,
                manifest.model,
                self.adapter.model_id()
            );
        }
    }
}

/// Run blocking filesystem work off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::operation(format!("blocking task failed: {e}")))?
}

impl std::fmt::Debug for RecommenderFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommenderFacade")
            .field("adapter", &self.adapter)
            .field("store", &self.store)
            .field("ready", &self.is_ready())
            .finish()
    }
}
