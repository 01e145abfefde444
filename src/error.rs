use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::probe::ProbeState;

/// Main error type for a probe session
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Missing or invalid command-line / file configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The byte source failed while the demuxer was pulling data
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// The container could not be identified or its header is malformed
    #[error("Failed to open input: {0}")]
    Open(String),

    /// The stream table could not be parsed
    #[error("Failed to find stream info: {0}")]
    Discovery(String),

    /// A session operation was called out of order
    #[error("Invalid probe state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: ProbeState,
    },

    /// An error originating from the FFmpeg glue layer
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] FfmpegError),

    /// A standard I/O error outside the byte source (e.g. writing the report)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProbeError::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Failures of the underlying byte origin
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote transfer failed: {0}")]
    Remote(String),

    #[error("read deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<reqwest::Error> for ReadError {
    fn from(e: reqwest::Error) -> Self {
        ReadError::Remote(e.to_string())
    }
}

/// Per-stream resolution defects. These never abort a probe; they are
/// collected next to the successfully resolved records.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamError {
    #[error("stream {index}: invalid video dimensions {width}x{height}")]
    InvalidDimensions { index: usize, width: i32, height: i32 },

    #[error("stream {index}: invalid channel count {channels}")]
    InvalidChannels { index: usize, channels: i32 },

    #[error("stream {index}: invalid sample rate {sample_rate}")]
    InvalidSampleRate { index: usize, sample_rate: i32 },
}

impl StreamError {
    /// Index of the stream that failed to resolve
    pub fn index(&self) -> usize {
        match self {
            StreamError::InvalidDimensions { index, .. }
            | StreamError::InvalidChannels { index, .. }
            | StreamError::InvalidSampleRate { index, .. } => *index,
        }
    }
}

/// FFmpeg-specific errors
#[derive(Error, Debug)]
pub enum FfmpegError {
    /// Failure during global FFmpeg initialization
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),

    /// An FFmpeg allocation returned null
    #[error("FFmpeg allocation failed: {0}")]
    AllocFailed(&'static str),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProbeError>;
