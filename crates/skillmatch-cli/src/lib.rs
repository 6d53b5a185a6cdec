//! Command-line interface for SkillMatch.
//!
//! - [`SkillmatchCli`]: loads configuration and dispatches commands
//! - [`cli`]: clap argument definitions
//! - [`config`]: `confyg`-backed configuration (file, env, defaults)

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::SkillmatchCli;
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::{CatalogConfig, IndexConfig, SkillmatchConfig};
