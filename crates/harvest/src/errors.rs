//! Error types for the harvest CLI.
//!
//! Library failures are passed through unchanged so the user sees the harvester's own message.

use thiserror::Error;

/// Errors that can occur while running a `harvest` command.
#[derive(Error, Debug)]
pub enum HarvestErrors {
  /// Errors from the underlying harvester library
  #[error(transparent)]
  Harvester(#[from] harvester::HarvesterError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),

  /// Records could not be rendered as JSON
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// Some identifiers of a batch could not be harvested
  #[error("{failed} of {total} records could not be harvested")]
  Incomplete {
    /// Number of failed fetches
    failed: usize,
    /// Number of requested identifiers
    total:  usize,
  },
}
