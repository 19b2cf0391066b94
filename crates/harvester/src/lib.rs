//! A client for the OAI-PMH `GetRecord` verb against the arXiv repository.
//!
//! Given a preprint identifier the library normalizes it, builds the request URL, fetches the
//! XML document and folds its metadata into a flat [`Record`] of bibliographic fields. The
//! response may arrive in one of several metadata dialects (raw arXiv, Dublin Core, qualified
//! Dublin Core); all of them end up as the same logical fields.
//!
//! # Example
//! ```rust,no_run
//! use harvester::{client::OaiClient, record::field};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let client = OaiClient::new()?;
//!   let record = client.fetch_one("math.RA/0612188").await?;
//!   println!("Title: {:?}", record.field(field::TITLE));
//!   assert_eq!(record.field(field::EPRINT), Some("math/0612188"));
//!
//!   Ok(())
//! }
//! ```
//!
//! The pieces are also usable on their own:
//!
//! ```
//! use harvester::{endpoint::Endpoint, format::normalize_text, identifier::fix_key};
//!
//! assert_eq!(fix_key("math.QA/0601001"), "math/0601001");
//! assert_eq!(normalize_text("Test\nthis"), "Test this");
//!
//! let endpoint = Endpoint::default();
//! assert_eq!(
//!   endpoint.construct_url("hep-ph/0408155").as_str(),
//!   "http://export.arxiv.org/oai2?verb=GetRecord&identifier=oai%3AarXiv.org%3Ahep-ph%2F0408155&metadataPrefix=arXiv"
//! );
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod format;
pub mod identifier;
pub mod parser;
pub mod rate;
pub mod record;

pub use client::OaiClient;
pub use config::Config;
use endpoint::Endpoint;
pub use errors::HarvesterError;
use identifier::fix_key;
use rate::RateLimiter;
pub use record::Record;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HarvesterError>;
