//! SkillMatch Core: shared error types.
//!
//! This crate has no internal SkillMatch dependencies (dependency level 0).
//! Every other crate in the workspace reports failures through
//! [`Error`] so the recommender facade can tell a missing index apart from
//! an unreachable embedding service.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias

pub mod error;

pub use error::{Error, Result};
