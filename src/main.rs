// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments into a `Config`
//   and hand it to the UI flow.
// - Every failure ends up as one `poster: ...` line on stderr and exit 1.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use omdb_poster::{config::LOG_FILTER, ui::run, Args, Config, HttpTransport, LookupError};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Read the filter from `POSTER_LOG`, defaulting to warnings and above.
    // Logs go to stderr so stdout stays a single result line.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_FILTER)
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let config = Config::from(args);

    match try_main(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("poster: {}", e);
            if matches!(e.downcast_ref::<LookupError>(), Some(LookupError::Usage)) {
                eprintln!("{}", Args::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn try_main(config: &Config) -> anyhow::Result<()> {
    let transport = HttpTransport::new()?;
    run(config, transport)?;
    Ok(())
}
