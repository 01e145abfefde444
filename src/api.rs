use crate::config::ProbeConfig;
use crate::error::Result;
use crate::ffmpeg_utils::{FfmpegCodecRegistry, FfmpegEngine};
use crate::probe::probe;
use crate::resolve::{Resolution, StreamDescriptorResolver};
use crate::source::{open_locator, BufferedSource, Locator};

/// Probe the container named by `input` (path, `file://` or `http(s)://`)
pub fn probe_input(input: &str, config: &ProbeConfig) -> Result<Resolution> {
    config.validate()?;
    let locator = Locator::parse(input)?;
    let source = open_locator(&locator, config)?;
    tracing::info!("Probing {}", locator);
    probe_source(source, config)
}

/// Probe an already opened byte source with FFmpeg
pub fn probe_source(source: BufferedSource, config: &ProbeConfig) -> Result<Resolution> {
    let resolver = StreamDescriptorResolver::new(FfmpegCodecRegistry);
    probe(FfmpegEngine, &resolver, source, config.clone())
}
