// Command line arguments and the immutable configuration built from them.
// `Config` is created once in `main` and passed down explicitly.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::api::DEFAULT_ENDPOINT;
use crate::criterion::{append_pair, Criterion, LookupRequest};
use crate::error::{LookupError, Result};

/// Environment variable holding the tracing filter, e.g. `POSTER_LOG=debug`.
pub const LOG_FILTER: &str = "POSTER_LOG";

/// Look up a movie on OMDb and download its poster.
#[derive(Parser, Debug)]
#[command(name = "poster", author, version, about, long_about = None)]
pub struct Args {
    /// Movie title to search for
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// IMDb identifier to look up, e.g. tt1049413
    #[arg(short = 'i', long)]
    pub id: Option<String>,

    /// Year of release
    #[arg(short = 'y', long)]
    pub year: Option<String>,

    /// Plot length to request (short or full)
    #[arg(long)]
    pub plot: Option<String>,

    /// Directory the poster is written to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the movie summary before downloading
    #[arg(long)]
    pub info: bool,

    /// Hide the spinner and progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// OMDb endpoint the query is appended to
    #[arg(long, env = "OMDB_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// OMDb API key, sent as `apikey`
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub title: String,
    pub id: String,
    pub year: String,
    pub plot: String,
    pub output_dir: PathBuf,
    pub show_info: bool,
    pub quiet: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: String::new(),
            id: String::new(),
            year: String::new(),
            plot: String::new(),
            output_dir: PathBuf::from("."),
            show_info: false,
            quiet: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            title: args.title.unwrap_or_default(),
            id: args.id.unwrap_or_default(),
            year: args.year.unwrap_or_default(),
            plot: args.plot.unwrap_or_default(),
            output_dir: args.output_dir,
            show_info: args.info,
            quiet: args.quiet,
            endpoint: args.endpoint,
            api_key: args.api_key.filter(|k| !k.is_empty()),
        }
    }
}

impl Config {
    /// Validate the search criteria and assemble the request.
    ///
    /// Exactly one of title and id must be set; anything else is a usage
    /// error, reported before any network activity.
    pub fn request(&self) -> Result<LookupRequest> {
        let required = match (self.title.is_empty(), self.id.is_empty()) {
            (false, true) => Criterion::title(&self.title)?,
            (true, false) => Criterion::id(&self.id)?,
            _ => return Err(LookupError::Usage),
        };
        LookupRequest::new(required)?
            .with(Criterion::year(&self.year)?)?
            .with(Criterion::plot(&self.plot)?)
    }

    /// The endpoint URL with the API key, if any, already attached.
    pub fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|source| LookupError::Endpoint {
            url: self.endpoint.clone(),
            source,
        })?;
        if let Some(key) = &self.api_key {
            append_pair(&mut url, "apikey", key);
        }
        Ok(url)
    }
}
