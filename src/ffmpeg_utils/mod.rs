//! FFmpeg module - the demuxing engine behind the probe core
//!
//! This module handles:
//! - FFmpeg initialization and log routing
//! - Custom AVIOContext reading from a `BufferedSource`
//! - The `ContainerEngine` / `CodecRegistry` implementations

pub mod engine;
pub mod helpers;
pub mod io;

pub use engine::{FfmpegCodecRegistry, FfmpegContainer, FfmpegEngine, FfmpegStream};
pub use ffmpeg_next as ffmpeg;

use std::ffi::{c_char, c_int, c_void, CStr};

/// Initialize the FFmpeg library.
///
/// Call once at startup before probing. Returns an error if the underlying
/// C library fails to initialize.
pub fn init() -> Result<(), crate::error::FfmpegError> {
    ffmpeg::init().map_err(|e| {
        crate::error::FfmpegError::InitFailed(format!("ffmpeg::init() failed: {}", e))
    })?;

    tracing::debug!("FFmpeg initialized ({})", version_info());

    Ok(())
}

/// Route FFmpeg's log output through `tracing`.
///
/// `level` is one of trace/debug/info/warn/error and picks the matching
/// `av_log` verbosity.
///
/// **Safety & Ordering:** Must be called after `init()` and before any probing
/// begins, because altering the global log callback is not thread-safe.
pub fn install_log_filter(level: &str) {
    let av_level = match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" => ffmpeg::ffi::AV_LOG_DEBUG as c_int,
        "info" => ffmpeg::ffi::AV_LOG_INFO as c_int,
        "error" => ffmpeg::ffi::AV_LOG_ERROR as c_int,
        _ => ffmpeg::ffi::AV_LOG_WARNING as c_int,
    };

    // SAFETY: both functions modify global FFmpeg state and are called once
    // at startup, before any session exists.
    unsafe {
        ffmpeg::ffi::av_log_set_level(av_level);
        ffmpeg::ffi::av_log_set_callback(Some(ffmpeg_log_callback));
    }
}

/// Messages that non-seekable probing always triggers.
const SUPPRESSED_MESSAGES: &[&str] = &[
    "Estimating duration from bitrate, this may be inaccurate",
    "Could not find codec parameters for stream",
    "Consider increasing the value for the 'analyzeduration'",
];

unsafe extern "C" fn ffmpeg_log_callback(
    avcl: *mut c_void,
    level: c_int,
    fmt: *const c_char,
    vl: ffmpeg::ffi::va_list,
) {
    if level > ffmpeg::ffi::av_log_get_level() {
        return;
    }

    let mut buf = [0 as c_char; 1024];
    let mut print_prefix: c_int = 1;
    ffmpeg::ffi::av_log_format_line(
        avcl,
        level,
        fmt,
        vl,
        buf.as_mut_ptr(),
        buf.len() as c_int,
        &mut print_prefix,
    );

    let msg = CStr::from_ptr(buf.as_ptr()).to_string_lossy();
    let msg = msg.trim_end();
    if msg.is_empty() || SUPPRESSED_MESSAGES.iter().any(|s| msg.contains(s)) {
        return;
    }

    if level <= ffmpeg::ffi::AV_LOG_ERROR as c_int {
        tracing::error!(target: "ffmpeg", "{}", msg);
    } else if level <= ffmpeg::ffi::AV_LOG_WARNING as c_int {
        tracing::warn!(target: "ffmpeg", "{}", msg);
    } else if level <= ffmpeg::ffi::AV_LOG_INFO as c_int {
        tracing::info!(target: "ffmpeg", "{}", msg);
    } else {
        tracing::debug!(target: "ffmpeg", "{}", msg);
    }
}

/// Version of the linked libavformat, e.g. `libavformat 62.3.100`.
pub fn version_info() -> String {
    let v = ffmpeg::format::version();
    format!("libavformat {}.{}.{}", v >> 16, (v >> 8) & 0xff, v & 0xff)
}
