//! Stream descriptor resolution
//!
//! Turns the parsed header state of a stream into an owned `StreamRecord`.
//! Resolution does no I/O, so calling it twice on the same stream yields the
//! same record.

use serde::Serialize;

use crate::engine::{CodecRegistry, StreamParams};
use crate::error::StreamError;
use crate::types::{AudioAttrs, MediaKind, StreamRecord, VideoAttrs, UNKNOWN_CODEC};

/// Metadata key holding the stream language
pub const LANGUAGE_KEY: &str = "language";

/// Resolved records plus the streams that could not be resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub records: Vec<StreamRecord>,
    pub errors: Vec<StreamError>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.errors.is_empty()
    }
}

/// Resolves streams against a codec registry
pub struct StreamDescriptorResolver<R> {
    registry: R,
}

impl<R: CodecRegistry> StreamDescriptorResolver<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Resolve a single stream.
    ///
    /// Unknown codecs resolve to `"unknown"` and a missing language to `None`;
    /// only non-positive dimensions, channel counts or sample rates fail.
    pub fn resolve<S>(&self, stream: &S) -> Result<StreamRecord, StreamError>
    where
        S: StreamParams<CodecId = R::Id>,
    {
        let index = stream.index();
        let media_kind = stream.media_kind();
        let codec_id = stream.codec_id();

        let (codec_name, codec_long_name) = match self.registry.lookup(codec_id) {
            Some(desc) => (desc.name, desc.long_name),
            None => {
                tracing::debug!("stream {}: codec {:?} not in registry", index, codec_id);
                (UNKNOWN_CODEC.to_string(), None)
            }
        };

        let mut record = StreamRecord {
            index,
            media_kind,
            codec_name,
            codec_long_name,
            language: stream.metadata(LANGUAGE_KEY),
            video: None,
            audio: None,
        };

        match media_kind {
            MediaKind::Video => {
                let (width, height) = (stream.width(), stream.height());
                match (positive(width), positive(height)) {
                    (Some(width), Some(height)) => {
                        record.video = Some(VideoAttrs { width, height })
                    }
                    _ => {
                        return Err(StreamError::InvalidDimensions {
                            index,
                            width,
                            height,
                        })
                    }
                }
            }
            MediaKind::Audio => {
                let channels = stream.channels();
                let channels = positive(channels)
                    .ok_or(StreamError::InvalidChannels { index, channels })?;
                let sample_rate = stream.sample_rate();
                let sample_rate_hz = positive(sample_rate)
                    .ok_or(StreamError::InvalidSampleRate { index, sample_rate })?;
                record.audio = Some(AudioAttrs {
                    channels,
                    sample_rate_hz,
                });
            }
            MediaKind::Subtitle | MediaKind::Other => {}
        }

        Ok(record)
    }

    /// Resolve every stream in order. Failures are collected, never fatal.
    pub fn resolve_all<'s, S, I>(&self, streams: I) -> Resolution
    where
        S: StreamParams<CodecId = R::Id> + 's,
        I: IntoIterator<Item = &'s S>,
    {
        let mut resolution = Resolution::default();
        for stream in streams {
            match self.resolve(stream) {
                Ok(record) => {
                    tracing::debug!(
                        "Resolved stream {}: {:?} {}",
                        record.index,
                        record.media_kind,
                        record.codec_name
                    );
                    resolution.records.push(record);
                }
                Err(e) => {
                    tracing::warn!("Skipping unresolvable stream: {}", e);
                    resolution.errors.push(e);
                }
            }
        }
        resolution
    }
}

fn positive(value: i32) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}
