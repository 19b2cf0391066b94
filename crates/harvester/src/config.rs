//! Client configuration.
//!
//! A [`Config`] gathers the endpoint, pacing and HTTP settings of an [`OaiClient`]. It is stored
//! as TOML; every key is optional and falls back to the defaults below.
//!
//! ```toml
//! base_url        = "http://export.arxiv.org/oai2"
//! archive         = "arXiv.org"
//! metadata_prefix = "arXiv"
//! entry_type      = "article"
//! min_interval_ms = 20000
//! timeout_secs    = 30
//! user_agent      = "harvester/0.1.0"
//! ```

use super::*;
use crate::{
  endpoint::{DEFAULT_ARCHIVE, DEFAULT_BASE_URL, DEFAULT_METADATA_PREFIX},
  record::DEFAULT_ENTRY_TYPE,
};

/// Default cool-down between two requests to the repository.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 20_000;
/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings of an [`OaiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// OAI-PMH endpoint
  pub base_url:        String,
  /// Repository name inside `oai:<archive>:<id>`
  pub archive:         String,
  /// Requested metadata format
  pub metadata_prefix: String,
  /// Entry type of harvested records
  pub entry_type:      String,
  /// Minimum time between two requests, in milliseconds
  pub min_interval_ms: u64,
  /// Request timeout, in seconds
  pub timeout_secs:    u64,
  /// `User-Agent` header sent with every request
  pub user_agent:      String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_url:        DEFAULT_BASE_URL.to_string(),
      archive:         DEFAULT_ARCHIVE.to_string(),
      metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
      entry_type:      DEFAULT_ENTRY_TYPE.to_string(),
      min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
      timeout_secs:    DEFAULT_TIMEOUT_SECS,
      user_agent:      concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string(),
    }
  }
}

impl Config {
  /// Default location of the configuration file in the user's config directory.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("harvester").join("config.toml")
  }

  /// Reads a configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&content)?)
  }

  /// Reads `path` if given, otherwise the default file if it exists, otherwise the defaults.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::load(path),
      None => {
        let path = Self::default_path();
        if path.exists() {
          debug!("Loading configuration from {}", path.display());
          Self::load(path)
        } else {
          Ok(Self::default())
        }
      },
    }
  }

  /// Writes the configuration as TOML, creating parent directories as needed.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Minimum time between two requests.
  pub fn min_interval(&self) -> Duration { Duration::from_millis(self.min_interval_ms) }

  /// Request timeout.
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}
