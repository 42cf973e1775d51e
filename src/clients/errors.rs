use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while resolving or downloading a track
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mixcloud API deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Can't find stream url for track '{0}'")]
    StreamNotFound(String),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
