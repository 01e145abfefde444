//! Command-line surface

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::api::probe_input;
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::report::{write_report, OutputFormat};
use crate::resolve::Resolution;

/// Lists the streams and codec details of a media file.
#[derive(Parser, Debug, Clone)]
#[command(name = "stream-probe")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source file or URI to probe.
    #[arg(short, long)]
    pub input: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read buffer capacity in bytes.
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Read deadline in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Demuxer option, repeatable (e.g. probesize=5000000).
    #[arg(long = "format-option", value_name = "KEY=VALUE")]
    pub format_options: Vec<String>,

    /// Print records and per-stream errors as JSON.
    #[arg(long)]
    pub json: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// The input locator; its absence is a configuration error.
    pub fn input(&self) -> Result<&str> {
        match self.input.as_deref().map(str::trim) {
            Some(input) if !input.is_empty() => Ok(input),
            _ => Err(ProbeError::Config("Missing --input=file".to_string())),
        }
    }

    /// Build the session configuration: file first, then flag overrides.
    pub fn probe_config(&self) -> Result<ProbeConfig> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::from_file(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(size) = self.buffer_size {
            config.buffer_capacity = size;
        }
        if let Some(secs) = self.timeout {
            config.read_timeout_secs = Some(secs);
        }
        for pair in &self.format_options {
            config.push_format_option(pair)?;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Probe the input and write the report to `out`.
///
/// Nothing is written unless the whole probe succeeded.
pub fn run<W: Write>(args: &Args, config: &ProbeConfig, out: &mut W) -> Result<Resolution> {
    let input = args.input()?;
    let resolution = probe_input(input, config)?;
    write_report(out, &resolution, args.output_format())?;
    Ok(resolution)
}
