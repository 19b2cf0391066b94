//! Error types for the harvester library.
//!
//! Every failure that can reach a caller of [`OaiClient::fetch_one`](crate::OaiClient::fetch_one)
//! is one of the variants below. Nothing is retried inside the library; retry policy belongs to
//! the caller.
//!
//! # Examples
//!
//! ```no_run
//! use harvester::{HarvesterError, OaiClient};
//!
//! # async fn example() -> Result<(), HarvesterError> {
//! let client = OaiClient::new()?;
//! match client.fetch_one("hep-ph/0408155").await {
//!   Ok(record) => println!("{record:?}"),
//!   Err(e) if e.is_network_failure() => println!("Network error: {e}"),
//!   Err(e) if e.is_malformed_response() => println!("Bad XML: {e}"),
//!   Err(e) => println!("Other error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Errors that can occur while harvesting a record.
#[derive(Error, Debug)]
pub enum HarvesterError {
  /// The identifier could not be understood.
  ///
  /// [`fix_key`](crate::identifier::fix_key) is total and never produces this; it exists so
  /// callers validating input up front can report it with the same type.
  #[error("Malformed identifier: {0}")]
  MalformedIdentifier(String),

  /// The HTTP exchange failed.
  ///
  /// This covers connection failures, timeouts and non-2xx status codes.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The response body was not well-formed XML.
  ///
  /// The diagnostic of the underlying reader is kept as-is.
  #[error("Malformed response: {0}")]
  MalformedResponse(#[from] quick_xml::Error),

  /// The response body contained no XML element at all.
  #[error("Malformed response: no root element")]
  EmptyResponse,

  /// The repository answered with an OAI-PMH `<error>` element.
  #[error("Repository error: {0}")]
  Repository(String),

  /// The configured base URL could not be parsed.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A configuration file could not be parsed.
  #[error(transparent)]
  Config(#[from] toml::de::Error),

  /// A configuration could not be rendered as TOML.
  #[error(transparent)]
  ConfigSerialize(#[from] toml::ser::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),
}

impl HarvesterError {
  /// Whether this error came from the network layer.
  ///
  /// Callers use this to decide whether backing off and trying again later makes sense.
  pub fn is_network_failure(&self) -> bool { matches!(self, HarvesterError::Network(_)) }

  /// Whether the repository sent something that is not a usable XML document.
  pub fn is_malformed_response(&self) -> bool {
    matches!(self, HarvesterError::MalformedResponse(_) | HarvesterError::EmptyResponse)
  }
}

#[cfg(test)]
mod tests {
  use quick_xml::errors::IllFormedError;

  use super::*;

  #[test]
  fn test_error_classification() {
    let malformed =
      HarvesterError::from(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
        "record".to_string(),
      )));
    assert!(malformed.is_malformed_response());
    assert!(!malformed.is_network_failure());
    assert!(malformed.to_string().starts_with("Malformed response"));

    assert!(HarvesterError::EmptyResponse.is_malformed_response());
    assert!(!HarvesterError::Repository("idDoesNotExist".into()).is_malformed_response());
  }
}
