//! Media container stream probe
//!
//! Opens a container through a buffered, forward-only byte source, lets
//! FFmpeg discover its elementary streams and resolves each one into a typed
//! `StreamRecord`.

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ffmpeg_utils;
pub mod probe;
pub mod report;
pub mod resolve;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use api::{probe_input, probe_source};
pub use config::ProbeConfig;
pub use error::{FfmpegError, ProbeError, ReadError, Result, StreamError};
pub use probe::{probe, ProbeSession, ProbeState};
pub use resolve::{Resolution, StreamDescriptorResolver};
pub use source::{BufferedSource, ByteSource, MemorySource, ReadOutcome};
pub use types::{AudioAttrs, MediaKind, StreamRecord, VideoAttrs};
