// UI layer: runs one lookup + download and reports on the terminal.
// Progress goes to stderr through `indicatif`; stdout only gets the optional
// movie summary and the final result line.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::{OmdbClient, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::poster::{fetch_poster, PosterFile};

/// Look up the movie described by `config` and save its poster.
///
/// Criteria are validated before the transport is used, so a usage error
/// never costs a request.
pub fn run<T: Transport>(config: &Config, transport: T) -> Result<PosterFile> {
    let request = config.request()?;
    let client = OmdbClient::new(transport, config.endpoint()?);
    info!(query = %request.required(), "looking up movie");

    let spinner = spinner(config.quiet);
    spinner.set_message(format!("Looking up {}...", request.required().value()));
    let movie = client.lookup(&request);
    spinner.finish_and_clear();
    let movie = movie?;

    if config.show_info {
        print!("{}", movie);
    }

    let bar = download_bar(config.quiet);
    bar.set_message(format!("Downloading poster for {}", movie.title));
    let poster = fetch_poster(client.transport(), &movie, &config.output_dir, &bar);
    bar.finish_and_clear();
    let poster = poster?;

    println!(
        "{} => {} ({} bytes).",
        request.required().value(),
        poster.path.display(),
        poster.bytes
    );
    Ok(poster)
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Byte counter that turns into a bar once the content length is known.
fn download_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {bytes}/{total_bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}
