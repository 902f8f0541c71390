// Error taxonomy for the library half of the crate. The binary wraps these
// in `anyhow` at the top level; everything below `main` returns
// `LookupError` so tests can match on the exact failure.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

/// Boxed cause for transport failures, so mock transports in tests can
/// fail without constructing a `reqwest::Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("usage: exactly one of --title or --id is required")]
    Usage,

    #[error("{0} is required")]
    MissingRequired(&'static str),

    #[error("invalid year: {0:?}")]
    InvalidYear(String),

    #[error("invalid plot length: {0:?} (expected \"short\" or \"full\")")]
    InvalidPlot(String),

    #[error("extra param {0:?} must not be required")]
    RequiredAsOptional(String),

    #[error("param {0:?} cannot select a movie on its own")]
    OptionalAsRequired(String),

    #[error("wrong key: expected {expected:?}, got {actual:?}")]
    WrongKey {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid endpoint {url:?}: {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("getting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("getting {url}: {status}")]
    Status { url: String, status: StatusCode },

    #[error("unmarshaling json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("movie not found: {0}")]
    NotFound(String),

    #[error("the movie has no poster")]
    NoPoster,

    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
