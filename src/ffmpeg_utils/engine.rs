//! FFmpeg-backed container engine and codec registry

use std::ffi::c_int;
use std::ptr;

use ffmpeg_next as ffmpeg;

use super::helpers;
use super::io::AvioReader;
use crate::config::ProbeConfig;
use crate::engine::{CodecDescriptor, CodecRegistry, Container, ContainerEngine, StreamParams};
use crate::error::{FfmpegError, ProbeError, Result};
use crate::source::BufferedSource;
use crate::types::MediaKind;

/// Opens containers with libavformat over a custom read callback
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEngine;

/// Codec names from libavcodec's descriptor table
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegCodecRegistry;

/// An opened libavformat input.
///
/// Field order matters: `input` is closed before `avio` frees the I/O
/// context it reads through.
pub struct FfmpegContainer {
    input: ffmpeg::format::context::Input,
    avio: AvioReader,
}

/// One stream of an `FfmpegContainer`
pub struct FfmpegStream<'a> {
    stream: ffmpeg::Stream<'a>,
    params: ffmpeg::codec::Parameters,
}

impl ContainerEngine for FfmpegEngine {
    type Container = FfmpegContainer;

    fn open(&self, source: BufferedSource, config: &ProbeConfig) -> Result<FfmpegContainer> {
        let buffer_size = source.capacity();
        let mut avio = AvioReader::new(source, buffer_size)?;

        let mut options = ffmpeg::Dictionary::new();
        for (key, value) in &config.format_options {
            options.set(key, value);
        }

        unsafe {
            let mut ps = ffmpeg::ffi::avformat_alloc_context();
            if ps.is_null() {
                return Err(FfmpegError::AllocFailed("format context").into());
            }
            (*ps).pb = avio.as_mut_ptr();
            (*ps).flags |= ffmpeg::ffi::AVFMT_FLAG_CUSTOM_IO as c_int;

            let mut opts = options.disown();
            let ret = ffmpeg::ffi::avformat_open_input(
                &mut ps,
                ptr::null(),
                ptr::null_mut(),
                &mut opts,
            );
            let unused = ffmpeg::Dictionary::own(opts);
            for (key, _) in unused.iter() {
                tracing::debug!("Demuxer ignored option: {}", key);
            }

            // On failure avformat_open_input has already freed `ps`; the
            // custom AVIO side goes away with `avio`.
            if ret < 0 {
                if let Some(e) = avio.take_error() {
                    return Err(ProbeError::Read(e));
                }
                return Err(ProbeError::Open(ffmpeg::Error::from(ret).to_string()));
            }

            // Header probing may swallow a source failure and still succeed.
            let input = ffmpeg::format::context::Input::wrap(ps);
            if let Some(e) = avio.take_error() {
                drop(input);
                return Err(ProbeError::Read(e));
            }
            tracing::debug!(
                "Opened container: format={}, header bytes={}",
                helpers::input_format_name(&input),
                avio.bytes_read()
            );
            Ok(FfmpegContainer { input, avio })
        }
    }
}

impl Container for FfmpegContainer {
    type CodecId = ffmpeg::codec::Id;
    type Stream<'a> = FfmpegStream<'a>;

    fn find_streams(&mut self) -> Result<()> {
        // SAFETY: `input` wraps a context opened by `FfmpegEngine::open` and
        // stays valid for the lifetime of `self`.
        let ret = unsafe {
            ffmpeg::ffi::avformat_find_stream_info(self.input.as_mut_ptr(), ptr::null_mut())
        };
        if ret < 0 {
            if let Some(e) = self.avio.take_error() {
                return Err(ProbeError::Read(e));
            }
            return Err(ProbeError::Discovery(ffmpeg::Error::from(ret).to_string()));
        }
        // A failed read during stream info is treated as end of file by
        // libavformat, which then reports success.
        if let Some(e) = self.avio.take_error() {
            return Err(ProbeError::Read(e));
        }

        tracing::debug!(
            "Stream info complete: {} streams, {} bytes read",
            self.input.nb_streams(),
            self.avio.bytes_read()
        );
        Ok(())
    }

    fn streams(&self) -> Vec<FfmpegStream<'_>> {
        self.input
            .streams()
            .map(|stream| {
                let params = stream.parameters();
                FfmpegStream { stream, params }
            })
            .collect()
    }

    fn format_name(&self) -> Option<String> {
        Some(helpers::input_format_name(&self.input))
    }
}

impl StreamParams for FfmpegStream<'_> {
    type CodecId = ffmpeg::codec::Id;

    fn index(&self) -> usize {
        self.stream.index()
    }

    fn media_kind(&self) -> MediaKind {
        match self.params.medium() {
            ffmpeg::media::Type::Video => MediaKind::Video,
            ffmpeg::media::Type::Audio => MediaKind::Audio,
            ffmpeg::media::Type::Subtitle => MediaKind::Subtitle,
            _ => MediaKind::Other,
        }
    }

    fn codec_id(&self) -> ffmpeg::codec::Id {
        self.params.id()
    }

    fn width(&self) -> i32 {
        helpers::codec_params_width(&self.params)
    }

    fn height(&self) -> i32 {
        helpers::codec_params_height(&self.params)
    }

    fn channels(&self) -> i32 {
        helpers::codec_params_channels(&self.params)
    }

    fn sample_rate(&self) -> i32 {
        helpers::codec_params_sample_rate(&self.params)
    }

    fn metadata(&self, key: &str) -> Option<String> {
        self.stream.metadata().get(key).map(|s| s.to_string())
    }
}

impl CodecRegistry for FfmpegCodecRegistry {
    type Id = ffmpeg::codec::Id;

    fn lookup(&self, id: ffmpeg::codec::Id) -> Option<CodecDescriptor> {
        helpers::codec_descriptor_names(id).map(|(name, long_name)| CodecDescriptor { name, long_name })
    }
}
