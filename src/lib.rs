// Library root
// -----------
// This crate exposes a small library surface for the `poster` binary.
//
// Module responsibilities:
// - `criterion`: search criteria (title, id, year, plot) and the request
//   builder that validates them and assembles the OMDb query.
// - `api`: the `Transport` seam, the reqwest-backed transport and the
//   OMDb client that dispatches a request and decodes the movie record.
// - `poster`: downloads a movie's poster to disk.
// - `config`: command line arguments and the immutable `Config`.
// - `ui`: the terminal flow tying the above together.
//
// Keeping the network behind `Transport` lets the whole flow run against
// a mock in tests.
pub mod api;
pub mod config;
pub mod criterion;
pub mod error;
pub mod poster;
pub mod ui;

pub use api::{HttpTransport, Movie, OmdbClient, Transport};
pub use config::{Args, Config};
pub use criterion::{Criterion, LookupRequest, PlotLength};
pub use error::{LookupError, Result};
pub use poster::{fetch_poster, PosterFile};
