//! Client that harvests single records from an OAI-PMH repository.
//!
//! [`OaiClient`] runs the whole pipeline for one identifier: it normalizes the identifier with
//! [`fix_key`], renders the request URL, waits for its [`RateLimiter`], performs one HTTP GET and
//! folds the response into a fresh [`Record`]. Failures are returned as they happen; nothing is
//! retried.
//!
//! # Examples
//!
//! ```no_run
//! use harvester::{record::field, Config, OaiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OaiClient::from_config(&Config::default())?;
//!
//! // Requests through the same client are spaced by the configured interval.
//! for record in client.fetch_many(&["hep-ph/0408155", "math.QA/0601001"]).await {
//!   let record = record?;
//!   println!("{:?}: {:?}", record.field(field::EPRINT), record.field(field::TITLE));
//! }
//! # Ok(())
//! # }
//! ```

use super::*;
use crate::identifier::{classify, IdentifierKind};

/// Client for the OAI-PMH `GetRecord` verb.
///
/// Cloning a client is cheap; clones share the HTTP connection pool and the rate limiter.
#[derive(Debug, Clone)]
pub struct OaiClient {
  /// Internal web client used to connect to the repository.
  client:     reqwest::Client,
  /// Renders identifiers into request URLs.
  endpoint:   Endpoint,
  /// Spaces out consecutive requests.
  limiter:    RateLimiter,
  /// Entry type given to harvested records.
  entry_type: String,
}

impl OaiClient {
  /// Creates a client for the arXiv repository with the default [`Config`].
  pub fn new() -> Result<Self> { Self::from_config(&Config::default()) }

  /// Creates a client from a configuration, with its own rate limiter.
  ///
  /// # Errors
  ///
  /// Fails if the base URL does not parse or the HTTP client cannot be built.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(&config.user_agent)
      .timeout(config.timeout())
      .build()?;

    Ok(Self {
      client,
      endpoint: Endpoint::from_config(config)?,
      limiter: RateLimiter::new(config.min_interval()),
      entry_type: config.entry_type.clone(),
    })
  }

  /// Replaces the rate limiter, e.g. with one shared by several clients.
  pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
    self.limiter = limiter;
    self
  }

  /// The endpoint requests are sent to.
  pub fn endpoint(&self) -> &Endpoint { &self.endpoint }

  /// The rate limiter pacing this client.
  pub fn rate_limiter(&self) -> &RateLimiter { &self.limiter }

  /// Fetches the record for `raw_identifier` into a new [`Record`].
  ///
  /// The identifier may be in legacy (`math.RA/0601001`) or modern (`arXiv:0709.3040v1`) form.
  /// On success the record's `eprint` field is `fix_key(raw_identifier)` whenever the repository
  /// echoes the requested identifier.
  ///
  /// # Errors
  ///
  /// - [`HarvesterError::Network`] if the request fails, times out, or returns a non-2xx status;
  /// - [`HarvesterError::MalformedResponse`] or [`HarvesterError::EmptyResponse`] if the body is
  ///   not a well-formed XML document;
  /// - [`HarvesterError::Repository`] if the repository answers with an OAI-PMH error.
  pub async fn fetch_one(&self, raw_identifier: &str) -> Result<Record> {
    let mut record = Record::new(self.entry_type.clone());
    self.fetch_into(raw_identifier, &mut record).await?;
    Ok(record)
  }

  /// Fetches the record for `raw_identifier` into a caller-owned record.
  ///
  /// If parsing fails midway, the fields read so far stay on `record`.
  pub async fn fetch_into(&self, raw_identifier: &str, record: &mut Record) -> Result<()> {
    if classify(raw_identifier) == IdentifierKind::Unrecognized {
      warn!("Identifier {raw_identifier:?} is neither a legacy nor a modern arXiv identifier");
    }
    let identifier = fix_key(raw_identifier);
    let url = self.endpoint.construct_url(&identifier);

    self.limiter.acquire().await;
    debug!("Fetching {identifier} via: {url}");

    let response = self.client.get(url).send().await?;
    debug!("Response status: {}", response.status());
    let body = response.error_for_status()?.bytes().await?;

    trace!("Response body: {}", String::from_utf8_lossy(&body));

    parser::parse(body.as_ref(), record)
  }

  /// Fetches several records one after another, respecting the rate limit.
  ///
  /// Returns one result per identifier, in input order. A failed fetch does not stop the
  /// remaining ones.
  pub async fn fetch_many<S: AsRef<str>>(&self, raw_identifiers: &[S]) -> Vec<Result<Record>> {
    let mut results = Vec::with_capacity(raw_identifiers.len());
    for raw_identifier in raw_identifiers {
      results.push(self.fetch_one(raw_identifier.as_ref()).await);
    }
    results
  }
}
