use std::str::Utf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LandingError>;

#[derive(Error, Debug)]
pub enum LandingError {
    #[error("Server error: {status} from {url}")]
    ServerError { status: u16, url: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Parsing error")]
    Parse,
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LandingError {
    /// Both non-2xx responses and failed round trips count as server
    /// errors for the page.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. } | Self::Transport(_))
    }
}

impl From<Utf8Error> for LandingError {
    fn from(_: Utf8Error) -> Self {
        Self::Parse
    }
}

impl From<serde_json::Error> for LandingError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<toml::de::Error> for LandingError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
