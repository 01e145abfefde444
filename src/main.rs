//! stream-probe
//!
//! Lists the elementary streams of a media container (local file or remote
//! URI) with codec name, language and video/audio parameters.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stream_probe::cli::{self, Args};
use stream_probe::ffmpeg_utils;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "stream-probe";

fn main() -> ExitCode {
    let args = Args::parse();

    // Configuration problems are fatal before anything else happens
    let config = match args.input().and_then(|_| args.probe_config()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::from(e.exit_code());
        }
    };

    init_logging(&config.log_level);
    tracing::debug!("{} v{} starting", APP_NAME, VERSION);

    if let Err(e) = ffmpeg_utils::init() {
        eprintln!("{}: {}", APP_NAME, e);
        return ExitCode::FAILURE;
    }
    ffmpeg_utils::install_log_filter(&config.log_level);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli::run(&args, &config, &mut out) {
        Ok(resolution) => {
            tracing::info!(
                "Reported {} streams, {} unresolvable",
                resolution.records.len(),
                resolution.errors.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("Probe failed: {:?}", e);
            eprintln!("{}: {}", APP_NAME, e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initialize logging with tracing. Logs go to stderr; stdout is the report.
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
