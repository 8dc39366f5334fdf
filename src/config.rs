//! Client configuration: API credential, endpoint, and defaults.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line flags and environment variables (see [`crate::cli::Cli`]).
//! A missing or blank API key is not an error; it switches the client into
//! permanent mock-data mode.

use crate::error::{NewsError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://gnews.io/api/v4";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GNews API token.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Country used for headlines when the filters name none.
    pub default_country: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load a YAML config file. Keys left out keep their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Returns
    ///
    /// The validated config, or an error if the file can't be read, isn't
    /// valid YAML, or fails [`Config::validate`].
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&text)?;
        info!(
            has_api_key = config.api_key().is_some(),
            base_url = %config.base_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if self.default_country.trim().is_empty() {
            return Err(NewsError::Config("default_country must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(NewsError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
