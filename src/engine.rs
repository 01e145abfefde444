//! Capabilities the probe core consumes from a demuxing engine
//!
//! The core never parses container bytes itself. It talks to an engine
//! through these traits:
//! - `ContainerEngine` opens a container on top of a `BufferedSource`
//! - `Container` discovers and lists the elementary streams
//! - `StreamParams` exposes the parsed header fields of one stream
//! - `CodecRegistry` maps codec identifiers to display names
//!
//! The FFmpeg implementation lives in `ffmpeg_utils::engine`.

use std::fmt;

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::source::BufferedSource;
use crate::types::MediaKind;

/// Registry entry for a codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecDescriptor {
    pub name: String,
    pub long_name: Option<String>,
}

/// Maps codec identifiers to descriptors
pub trait CodecRegistry {
    type Id: Copy + fmt::Debug;

    /// `None` when the identifier is not registered
    fn lookup(&self, id: Self::Id) -> Option<CodecDescriptor>;
}

/// Parsed header state of one stream. Accessors return the raw values the
/// demuxer reported; validation happens in the resolver.
pub trait StreamParams {
    type CodecId: Copy + fmt::Debug;

    fn index(&self) -> usize;
    fn media_kind(&self) -> MediaKind;
    fn codec_id(&self) -> Self::CodecId;
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn channels(&self) -> i32;
    fn sample_rate(&self) -> i32;

    /// Look up a key in the stream's metadata dictionary
    fn metadata(&self, key: &str) -> Option<String>;
}

/// An opened container. Dropping it releases every resource tied to it.
pub trait Container {
    type CodecId: Copy + fmt::Debug;
    type Stream<'a>: StreamParams<CodecId = Self::CodecId>
    where
        Self: 'a;

    /// Read as deep into the input as needed to fill in stream parameters.
    fn find_streams(&mut self) -> Result<()>;

    /// Streams in the container's own order
    fn streams(&self) -> Vec<Self::Stream<'_>>;

    /// Short name of the detected container format
    fn format_name(&self) -> Option<String> {
        None
    }
}

/// Opens containers on top of a byte source
pub trait ContainerEngine {
    type Container: Container;

    /// Identify the container and parse its header. On failure nothing
    /// acquired during the attempt outlives the call.
    fn open(&self, source: BufferedSource, config: &ProbeConfig) -> Result<Self::Container>;
}
