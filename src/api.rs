// API client module: a small blocking client for the OMDb metadata service.
// Network access goes through the `Transport` trait so the lookup and the
// poster download can run against a mock in tests.

use std::fmt;
use std::io::Read;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::criterion::{Criterion, LookupRequest};
use crate::error::{LookupError, Result};

/// Default OMDb endpoint. `v=1` pins the API version.
pub const DEFAULT_ENDPOINT: &str = "http://www.omdbapi.com/?v=1";

/// Status and body of a completed GET.
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

/// Performs a single GET. Implementations report connection level failures
/// as `LookupError::Transport`; status codes are left to the caller.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// `Transport` backed by a reqwest blocking client with default timeouts.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::Client)?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!(%url, "GET");
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| LookupError::Transport {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        Ok(HttpResponse {
            status: res.status(),
            content_length: res.content_length(),
            body: Box::new(res),
        })
    }
}

/// Movie record as returned by OMDb. Field names follow the wire format;
/// fields OMDb leaves out decode as empty strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub actors: String,
    pub plot: String,
    pub poster: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.imdb_id)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Plot: {}", self.plot)
    }
}

/// OMDb answers misses with a 200 and `"Response": "False"`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(flatten)]
    movie: Movie,
}

/// Client bound to one endpoint and one transport.
pub struct OmdbClient<T> {
    transport: T,
    endpoint: Url,
}

impl<T: Transport> OmdbClient<T> {
    pub fn new(transport: T, endpoint: Url) -> Self {
        OmdbClient {
            transport,
            endpoint,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch on the request's required criterion.
    pub fn lookup(&self, request: &LookupRequest) -> Result<Movie> {
        match request.required() {
            Criterion::Title(_) => self.by_title(request),
            Criterion::Id(_) => self.by_id(request),
            other => Err(LookupError::OptionalAsRequired(other.to_string())),
        }
    }

    pub fn by_title(&self, request: &LookupRequest) -> Result<Movie> {
        expect_key(request, "t")?;
        self.get(request)
    }

    pub fn by_id(&self, request: &LookupRequest) -> Result<Movie> {
        expect_key(request, "i")?;
        self.get(request)
    }

    fn get(&self, request: &LookupRequest) -> Result<Movie> {
        let url = request.query_url(&self.endpoint);
        let res = self.transport.get(url.as_str())?;
        if res.status != StatusCode::OK {
            return Err(LookupError::Status {
                url: url.to_string(),
                status: res.status,
            });
        }

        let envelope: Envelope = serde_json::from_reader(res.body)?;
        if envelope.response.as_deref() == Some("False") {
            let message = envelope.error.unwrap_or_else(|| "unknown error".into());
            return Err(LookupError::NotFound(message));
        }
        debug!(title = %envelope.movie.title, id = %envelope.movie.imdb_id, "decoded movie");
        Ok(envelope.movie)
    }
}

fn expect_key(request: &LookupRequest, expected: &'static str) -> Result<()> {
    let actual = request.required().key();
    if actual != expected {
        return Err(LookupError::WrongKey { expected, actual });
    }
    Ok(())
}
