//! Report formatting

use std::io::Write;

use crate::resolve::Resolution;
use crate::types::{MediaKind, StreamRecord};

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per stream
    #[default]
    Text,
    /// The whole resolution as a JSON document
    Json,
}

/// Text line for one record. Streams of `Other` kind have no line.
pub fn format_record(record: &StreamRecord) -> Option<String> {
    match (record.media_kind, record.video, record.audio) {
        (MediaKind::Video, Some(video), _) => Some(format!(
            "stream {}: {} video, {}x{}",
            record.index, record.codec_name, video.width, video.height
        )),
        (MediaKind::Audio, _, Some(audio)) => Some(format!(
            "stream {}: {} {} audio, {} channels, {} Hz",
            record.index,
            record.language_or_empty(),
            record.codec_name,
            audio.channels,
            audio.sample_rate_hz
        )),
        (MediaKind::Subtitle, _, _) => Some(format!(
            "stream {}: {} {} subtitle",
            record.index,
            record.language_or_empty(),
            record.codec_name
        )),
        _ => None,
    }
}

/// Write the report for `resolution` in `format`.
pub fn write_report<W: Write>(
    out: &mut W,
    resolution: &Resolution,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => {
            for line in resolution.records.iter().filter_map(format_record) {
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, resolution)?;
            writeln!(out)?;
        }
    }
    out.flush()
}
