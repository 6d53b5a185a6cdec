//! SkillMatch CLI application.
//!
//! Owns the loaded configuration and dispatches parsed commands to the
//! recommender facade.

use crate::cli::{CliArgs, Command};
use crate::config::SkillmatchConfig;
use crate::config_handlers;
use skillmatch::catalog::format_price;
use skillmatch::{
    BuildReport, EnsureOutcome, IndexStatus, RebuildPolicy, Recommendations, RecommenderFacade,
    Result, summarize, to_csv_string,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SkillmatchCli
// ============================================================================

/// The `skillmatch` command-line application.
pub struct SkillmatchCli {
    name: String,
    config: Arc<SkillmatchConfig>,
    version: String,
}

impl SkillmatchCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = SkillmatchConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: SkillmatchConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The effective configuration.
    pub fn config(&self) -> &SkillmatchConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Index { force, check }) => {
                let output = self.index(force, check).await?;
                println!("{output}");
                Ok(())
            }
            Some(Command::Recommend { query, limit, csv }) => {
                let output = self.recommend(&query.join(" "), limit, csv).await?;
                println!("{}", output.trim_end());
                Ok(())
            }
            Some(Command::Status) => {
                println!("{}", self.status()?);
                Ok(())
            }
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Command handlers
    // ------------------------------------------------------------------------

    async fn index(&self, force: bool, check: bool) -> Result<String> {
        let facade = self.config.facade()?;
        let source = self.config.catalog_source();

        if check {
            let fresh = facade.is_fresh(&source)?;
            return Ok(format!(
                "Index at {} is {}",
                facade.index_path().display(),
                if fresh { "fresh" } else { "stale or missing" }
            ));
        }

        let policy = if force {
            RebuildPolicy::Always
        } else {
            RebuildPolicy::IfStale
        };

        match facade.ensure_index(&source, policy).await? {
            EnsureOutcome::Built(report) => Ok(format_build_report(&report, &facade)),
            EnsureOutcome::Loaded { documents } => Ok(format!(
                "Index at {} is up to date ({documents} courses); use --force to rebuild",
                facade.index_path().display()
            )),
        }
    }

    async fn recommend(&self, query: &str, limit: Option<usize>, csv: bool) -> Result<String> {
        let facade = self.config.facade()?;
        let k = limit.unwrap_or(self.config.index.default_limit);

        match facade.load() {
            Ok(documents) => tracing::debug!(documents, "Loaded course index"),
            Err(e) if e.is_index_not_found() => {
                tracing::warn!("No index at {}", facade.index_path().display());
                return Ok("No course index found. Run `skillmatch index` first.".to_string());
            }
            Err(e) => return Err(e),
        }

        let results = match facade.recommend(query, k).await? {
            Recommendations::Ranked(results) => results,
            Recommendations::NotInitialized => {
                return Ok("The recommender is not initialized.".to_string());
            }
        };

        if csv {
            return to_csv_string(&results);
        }
        if results.is_empty() {
            return Ok(format!("No recommendations for \"{query}\""));
        }

        let mut out = format!("Top {} courses for \"{query}\":\n\n", results.len());
        for (rank, rec) in results.iter().enumerate() {
            let course = &rec.record;
            out.push_str(&format!(
                "{:>3}. {}  [score {:.4}]\n     {} | {} | {} | ₹{}\n",
                rank + 1,
                course.title,
                rec.score,
                or_dash(&course.provider),
                or_dash(&course.domain),
                or_dash(&course.duration),
                format_price(course.price),
            ));
        }
        if let Some(summary) = summarize(&results) {
            out.push_str(&format!(
                "\n{} results, average price ₹{:.2}, best match {:.4}\n",
                summary.count, summary.average_price, summary.best_score
            ));
        }
        Ok(out)
    }

    fn status(&self) -> Result<String> {
        let facade = self.config.facade()?;
        if facade.stats().stored {
            if let Err(e) = facade.load() {
                tracing::warn!("Stored index could not be loaded: {e}");
            }
        }
        Ok(format_status(&facade.stats()))
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn format_build_report(report: &BuildReport, facade: &RecommenderFacade) -> String {
    let mut out = format!(
        "Indexed {} courses ({} dims) into {} in {} ms",
        report.stats.documents_indexed,
        report.stats.embedding_dimension,
        facade.index_path().display(),
        report.stats.build_duration_ms
    );
    if report.load.missing_prices > 0 || report.load.unparseable_prices > 0 {
        out.push_str(&format!(
            "\nPrices defaulted to 0: {} missing, {} unparseable",
            report.load.missing_prices, report.load.unparseable_prices
        ));
    }
    out
}

fn format_status(status: &IndexStatus) -> String {
    let mut out = format!(
        "Index:      {}\nStored:     {}\nReady:      {}\nCourses:    {}\nModel:      {}",
        status.location.display(),
        if status.stored { "yes" } else { "no" },
        if status.ready { "yes" } else { "no" },
        status.documents,
        status.model_id,
    );
    if status.model_id.starts_with("hash/") {
        out.push_str(
            "\nMatching:   lexical (shared words); build with \
             `--features vector-fastembed` and set embedding.provider = \"fastembed\" \
             for semantic matching",
        );
    }
    if let Some(dimension) = status.dimension {
        out.push_str(&format!("\nDimension:  {dimension}"));
    }
    if let Some(manifest) = &status.manifest {
        out.push_str(&format!(
            "\nBuilt at:   {}\nBuilt by:   {} / {}\nHash:       {}",
            manifest.built_at.to_rfc3339(),
            manifest.provider,
            manifest.model,
            manifest.content_hash
        ));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
