//! Custom AVIOContext that pulls from a `BufferedSource`
//!
//! FFmpeg reads the container through a read callback instead of opening a
//! file itself. The callback and its state are owned by `AvioReader`, which
//! frees the AVIO context, its (possibly reallocated) buffer and the boxed
//! state exactly once when dropped.
//!
//! # Thread safety
//! Not thread-safe. One reader belongs to one probe session on one thread.

use std::ffi::{c_int, c_void};
use std::ptr;

use ffmpeg_next as ffmpeg;

use crate::error::{FfmpegError, ReadError};
use crate::source::{BufferedSource, ReadOutcome};

/// Smallest AVIO buffer handed to FFmpeg, one MPEG-TS packet.
pub const MIN_AVIO_BUFFER: usize = 188;

/// State reachable from the AVIO `opaque` pointer
struct ReadContext {
    source: BufferedSource,
    error: Option<ReadError>,
}

/// Owner of a read-only AVIOContext backed by a `BufferedSource`
pub struct AvioReader {
    ctx: *mut ffmpeg::ffi::AVIOContext,
    state: *mut ReadContext,
}

impl AvioReader {
    /// Allocate an AVIO context with a `buffer_size` byte exchange buffer
    /// (at least `MIN_AVIO_BUFFER`) that reads from `source`.
    pub fn new(source: BufferedSource, buffer_size: usize) -> Result<Self, FfmpegError> {
        let buffer_size = buffer_size.max(MIN_AVIO_BUFFER);

        unsafe {
            let buffer = ffmpeg::ffi::av_malloc(buffer_size as _) as *mut u8;
            if buffer.is_null() {
                return Err(FfmpegError::AllocFailed("AVIO buffer"));
            }

            let state = Box::into_raw(Box::new(ReadContext {
                source,
                error: None,
            }));

            let ctx = ffmpeg::ffi::avio_alloc_context(
                buffer,
                buffer_size as c_int,
                0,
                state as *mut c_void,
                Some(read_packet),
                None,
                None,
            );

            if ctx.is_null() {
                ffmpeg::ffi::av_free(buffer as *mut c_void);
                drop(Box::from_raw(state));
                return Err(FfmpegError::AllocFailed("AVIO context"));
            }

            Ok(Self { ctx, state })
        }
    }

    /// Raw context to attach to an `AVFormatContext` as `pb`
    pub fn as_mut_ptr(&mut self) -> *mut ffmpeg::ffi::AVIOContext {
        self.ctx
    }

    /// The read failure that made FFmpeg give up, if any
    pub fn take_error(&mut self) -> Option<ReadError> {
        // SAFETY: `state` is a live Box owned by `self` until drop.
        unsafe { (*self.state).error.take() }
    }

    /// Bytes delivered to FFmpeg so far
    pub fn bytes_read(&self) -> u64 {
        // SAFETY: same as `take_error`.
        unsafe { (*self.state).source.bytes_read() }
    }
}

impl Drop for AvioReader {
    fn drop(&mut self) {
        unsafe {
            if !self.ctx.is_null() {
                // FFmpeg may have swapped the exchange buffer during probing,
                // so free whatever the context holds now.
                ffmpeg::ffi::av_freep(&mut (*self.ctx).buffer as *mut *mut u8 as *mut c_void);
                ffmpeg::ffi::avio_context_free(&mut self.ctx);
            }
            if !self.state.is_null() {
                drop(Box::from_raw(self.state));
                self.state = ptr::null_mut();
            }
        }
    }
}

// C-compatible callback for FFmpeg

unsafe extern "C" fn read_packet(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    let state = &mut *(opaque as *mut ReadContext);
    if buf_size <= 0 {
        return 0;
    }

    let out = std::slice::from_raw_parts_mut(buf, buf_size as usize);
    match state.source.read(out) {
        Ok(ReadOutcome::Bytes(n)) if n > 0 => n as c_int,
        Ok(_) => ffmpeg::ffi::AVERROR_EOF,
        Err(e) => {
            tracing::debug!("byte source failed: {}", e);
            state.error = Some(e);
            ffmpeg::ffi::AVERROR_EXTERNAL
        }
    }
}
