//! Core types, configuration, and error handling for prgate.
//!
//! This crate provides the shared foundation used by the review crate and the CLI:
//! - [`PrGateError`] — unified error type using `thiserror`
//! - [`PrGateConfig`] — inputs loaded from `.prgate.toml` and `INPUT_*` variables
//! - [`RuleSet`] and [`CommentTemplates`] — compiled patterns and rendered comments
//! - [`PullRequestContext`] — the pull request being linted

pub mod config;
mod context;
mod error;
pub mod rules;
mod types;

pub use config::PrGateConfig;
pub use context::PullRequestContext;
pub use error::PrGateError;
pub use rules::{Checks, CommentTemplates, RuleSet};
pub use types::{ExistingReview, OutputFormat, ReviewEvent, ReviewState};

/// A convenience `Result` type for prgate operations.
pub type Result<T> = std::result::Result<T, PrGateError>;
