//! Pull request linting and review submission.
//!
//! Provides the decision table, the GitHub reviews client, cleanup of the
//! bot's earlier reviews, and the runner that ties them together.

pub mod cleanup;
pub mod decision;
pub mod github;
pub mod runner;

#[cfg(test)]
mod testing;
