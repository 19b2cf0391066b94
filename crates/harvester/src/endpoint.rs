//! Construction of OAI-PMH `GetRecord` request URLs.
//!
//! The request has a fixed shape:
//!
//! ```text
//! <base>?verb=GetRecord&identifier=oai%3A<archive>%3A<id>&metadataPrefix=<prefix>
//! ```
//!
//! with the identifier form-encoded, so `:` becomes `%3A` and `/` becomes `%2F`. Building a URL
//! never touches the network.

use url::Url;

use super::*;

/// Default OAI-PMH endpoint of the arXiv repository.
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/oai2";
/// Repository name used inside `oai:<archive>:<id>` identifiers.
pub const DEFAULT_ARCHIVE: &str = "arXiv.org";
/// Metadata format requesting the raw arXiv dialect.
pub const DEFAULT_METADATA_PREFIX: &str = "arXiv";

/// A parsed OAI-PMH endpoint that renders identifiers into request URLs.
///
/// # Examples
///
/// ```
/// use harvester::endpoint::Endpoint;
///
/// let endpoint = Endpoint::new("http://export.arxiv.org/oai2", "arXiv.org", "arXiv").unwrap();
/// let url = endpoint.construct_url("math/0612188");
/// assert_eq!(url.query(), Some("verb=GetRecord&identifier=oai%3AarXiv.org%3Amath%2F0612188&metadataPrefix=arXiv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  /// Base URL every request starts from
  base_url:        Url,
  /// Archive part of the OAI identifier
  archive:         String,
  /// Value of the `metadataPrefix` parameter
  metadata_prefix: String,
}

impl Endpoint {
  /// Creates an endpoint, validating the base URL once up front.
  ///
  /// # Errors
  ///
  /// Returns [`HarvesterError::InvalidUrl`] if `base_url` is not an absolute URL.
  pub fn new(
    base_url: &str,
    archive: impl Into<String>,
    metadata_prefix: impl Into<String>,
  ) -> Result<Self> {
    Ok(Self {
      base_url:        Url::parse(base_url)?,
      archive:         archive.into(),
      metadata_prefix: metadata_prefix.into(),
    })
  }

  /// Builds an endpoint from the request related part of a [`Config`].
  pub fn from_config(config: &Config) -> Result<Self> {
    Self::new(&config.base_url, &config.archive, &config.metadata_prefix)
  }

  /// Renders `identifier` into a `GetRecord` request URL.
  ///
  /// The identifier is used as given; callers that want the canonical form pass it through
  /// [`fix_key`] first. Parameters always appear in the order `verb`, `identifier`,
  /// `metadataPrefix`, after any query the base URL already carries.
  pub fn construct_url(&self, identifier: &str) -> Url {
    let mut url = self.base_url.clone();
    url
      .query_pairs_mut()
      .append_pair("verb", "GetRecord")
      .append_pair("identifier", &format!("oai:{}:{}", self.archive, identifier))
      .append_pair("metadataPrefix", &self.metadata_prefix);
    url
  }

  /// The base URL requests are built on.
  pub fn base_url(&self) -> &Url { &self.base_url }

  /// The metadata format requested from the repository.
  pub fn metadata_prefix(&self) -> &str { &self.metadata_prefix }
}

impl Default for Endpoint {
  fn default() -> Self {
    Self {
      base_url:        Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
      archive:         DEFAULT_ARCHIVE.to_string(),
      metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_url_constructor() {
    let endpoint = Endpoint::default();
    assert_eq!(
      endpoint.construct_url("hep-ph/0408155").as_str(),
      "http://export.arxiv.org/oai2?verb=GetRecord&identifier=oai%3AarXiv.org%3Ahep-ph%2F0408155&metadataPrefix=arXiv"
    );
    assert_eq!(
      endpoint.construct_url("math/0612188").as_str(),
      "http://export.arxiv.org/oai2?verb=GetRecord&identifier=oai%3AarXiv.org%3Amath%2F0612188&metadataPrefix=arXiv"
    );
  }

  #[test]
  fn test_url_constructor_is_deterministic() {
    let endpoint = Endpoint::default();
    assert_eq!(endpoint.construct_url("0709.3040v1"), endpoint.construct_url("0709.3040v1"));
  }

  #[test]
  fn test_custom_endpoint() -> anyhow::Result<()> {
    let endpoint = Endpoint::new("https://example.org/oai?token=abc", "example.org", "oai_dc")?;
    assert_eq!(
      endpoint.construct_url("1234").as_str(),
      "https://example.org/oai?token=abc&verb=GetRecord&identifier=oai%3Aexample.org%3A1234&metadataPrefix=oai_dc"
    );
    assert_eq!(endpoint.metadata_prefix(), "oai_dc");
    Ok(())
  }

  #[test]
  fn test_invalid_base_url() {
    let err = Endpoint::new("not a url", DEFAULT_ARCHIVE, DEFAULT_METADATA_PREFIX).unwrap_err();
    assert!(matches!(err, HarvesterError::InvalidUrl(_)));
  }

  #[test]
  fn test_endpoint_from_config() -> anyhow::Result<()> {
    assert_eq!(Endpoint::from_config(&Config::default())?, Endpoint::default());
    Ok(())
  }
}
