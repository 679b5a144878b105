use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::profile::Endpoints;
use crate::{LandingError, Result, API_URL_ENV, DEFAULT_INTENT_SCHEME};

/// Deployment settings of the page.
///
/// Stored as TOML:
/// ```toml
/// api_url = "https://api.example.com"
/// intent_scheme = "happ://add/"   # optional
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingConfig {
    pub api_url: Url,
    #[serde(default = "default_intent_scheme")]
    pub intent_scheme: String,
}

fn default_intent_scheme() -> String {
    DEFAULT_INTENT_SCHEME.to_owned()
}

impl LandingConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            intent_scheme: default_intent_scheme(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: LandingConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Load from `path`, then apply the `LANDING_API_URL` override.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            LandingError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&text)?.with_env_override()
    }

    /// Build from `LANDING_API_URL` alone.
    pub fn from_env() -> Result<Self> {
        let raw = env::var(API_URL_ENV).map_err(|_| {
            LandingError::Config(format!("{} is not set", API_URL_ENV))
        })?;
        Self::new(parse_api_url(&raw)?).validate()
    }

    fn with_env_override(mut self) -> Result<Self> {
        if let Ok(raw) = env::var(API_URL_ENV) {
            log::info!("{} overrides configured api_url", API_URL_ENV);
            self.api_url = parse_api_url(&raw)?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if !matches!(self.api_url.scheme(), "http" | "https") {
            return Err(LandingError::Config(format!(
                "api_url must be http(s), got {}",
                self.api_url
            )));
        }
        if self.intent_scheme.is_empty() {
            return Err(LandingError::Config(
                "intent_scheme must not be empty".to_owned(),
            ));
        }
        Ok(self)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_url, self.intent_scheme.clone())
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    Url::parse(raw.trim())
        .map_err(|e| LandingError::Config(format!("bad api_url {raw:?}: {e}")))
}
