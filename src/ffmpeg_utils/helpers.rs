//! Safe wrappers around FFmpeg FFI calls.
//!
//! Every function in this module is `pub` and **safe** to call.  All `unsafe`
//! blocks are contained here with explicit safety arguments.  Callers outside
//! this module should never need to write `unsafe` for routine FFmpeg access.

use std::ffi::{c_char, CStr};

use ffmpeg_next as ffmpeg;

// ── Codec-parameter field accessors ─────────────────────────────────────────
//
// Values are returned raw (as the C `int` FFmpeg stores) so callers can tell
// "unset" (0) and garbage (negative) apart from real values.

/// Read `width` from an `AVCodecParameters` struct.
///
/// `ffmpeg-next` does not expose this field through a safe accessor.
pub fn codec_params_width(params: &ffmpeg::codec::Parameters) -> i32 {
    // SAFETY: `params.as_ptr()` returns a valid non-null pointer for the
    // lifetime of `params`.  `width` is a plain int field.
    unsafe { (*params.as_ptr()).width }
}

/// Read `height` from an `AVCodecParameters` struct.
pub fn codec_params_height(params: &ffmpeg::codec::Parameters) -> i32 {
    // SAFETY: same as `codec_params_width`.
    unsafe { (*params.as_ptr()).height }
}

/// Read `sample_rate` from an `AVCodecParameters` struct.
pub fn codec_params_sample_rate(params: &ffmpeg::codec::Parameters) -> i32 {
    // SAFETY: same as `codec_params_width`.
    unsafe { (*params.as_ptr()).sample_rate }
}

/// Read `ch_layout.nb_channels` from an `AVCodecParameters` struct.
pub fn codec_params_channels(params: &ffmpeg::codec::Parameters) -> i32 {
    // SAFETY: same as `codec_params_width`.
    unsafe { (*params.as_ptr()).ch_layout.nb_channels }
}

// ── Codec descriptor lookup ──────────────────────────────────────────────────

/// Short and long name of the registered descriptor for `codec_id`.
///
/// Returns `None` for `Id::None` and for identifiers FFmpeg has no
/// descriptor for.
pub fn codec_descriptor_names(codec_id: ffmpeg::codec::Id) -> Option<(String, Option<String>)> {
    if codec_id == ffmpeg::codec::Id::None {
        return None;
    }

    // SAFETY: `avcodec_descriptor_get` reads a static, read-only table and
    // returns either null or a pointer with 'static lifetime.  `name` is
    // always set on a descriptor; `long_name` may be null.
    unsafe {
        let desc = ffmpeg::ffi::avcodec_descriptor_get(codec_id.into());
        if desc.is_null() {
            return None;
        }
        let name = cstr_to_string((*desc).name)?;
        let long_name = cstr_to_string((*desc).long_name);
        Some((name, long_name))
    }
}

/// Short name of the demuxer attached to an opened input.
pub fn input_format_name(input: &ffmpeg::format::context::Input) -> String {
    input.format().name().to_string()
}

/// Copy a nullable C string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}
