//! Test fixtures
//!
//! - A synthetic container format with its own engine and codec registry, so
//!   the probe core can be exercised without FFmpeg
//! - Generated PCM WAV files for tests that go through the real FFmpeg engine

use std::cell::Cell;
use std::rc::Rc;

use bytes::{Buf, BufMut, BytesMut};

use crate::config::ProbeConfig;
use crate::engine::{CodecDescriptor, CodecRegistry, Container, ContainerEngine, StreamParams};
use crate::error::{ProbeError, ReadError, Result};
use crate::source::{BufferedSource, ByteSource, ReadOutcome};
use crate::types::MediaKind;

/// Magic bytes opening every synthetic container
pub const MAGIC: &[u8; 4] = b"SPRB";

pub const CODEC_H264: u32 = 1;
pub const CODEC_AAC: u32 = 2;
pub const CODEC_SUBRIP: u32 = 3;
pub const CODEC_BIN_DATA: u32 = 4;

/// Scratch size the synthetic demuxer pulls with
const PULL_SIZE: usize = 188;

/// Header of one synthetic stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticStream {
    pub index: usize,
    pub kind: MediaKind,
    pub codec: u32,
    pub width: i32,
    pub height: i32,
    pub channels: i32,
    pub sample_rate: i32,
    pub language: Option<String>,
}

impl SyntheticStream {
    pub fn video(codec: u32, width: i32, height: i32) -> Self {
        Self {
            index: 0,
            kind: MediaKind::Video,
            codec,
            width,
            height,
            channels: 0,
            sample_rate: 0,
            language: None,
        }
    }

    pub fn audio(codec: u32, language: Option<&str>, channels: i32, sample_rate: i32) -> Self {
        Self {
            index: 0,
            kind: MediaKind::Audio,
            codec,
            width: 0,
            height: 0,
            channels,
            sample_rate,
            language: language.map(str::to_string),
        }
    }

    pub fn subtitle(codec: u32, language: Option<&str>) -> Self {
        Self {
            kind: MediaKind::Subtitle,
            ..Self::audio(codec, language, 0, 0)
        }
    }

    pub fn data(codec: u32) -> Self {
        Self {
            kind: MediaKind::Other,
            ..Self::audio(codec, None, 0, 0)
        }
    }
}

fn kind_tag(kind: MediaKind) -> u8 {
    match kind {
        MediaKind::Video => 0,
        MediaKind::Audio => 1,
        MediaKind::Subtitle => 2,
        MediaKind::Other => 3,
    }
}

fn kind_from_tag(tag: u8) -> MediaKind {
    match tag {
        0 => MediaKind::Video,
        1 => MediaKind::Audio,
        2 => MediaKind::Subtitle,
        _ => MediaKind::Other,
    }
}

/// Serialize a synthetic container holding `streams` in order
pub fn build_container(streams: &[SyntheticStream]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_slice(MAGIC);
    buf.put_u8(streams.len() as u8);
    for stream in streams {
        buf.put_u8(kind_tag(stream.kind));
        buf.put_u32(stream.codec);
        buf.put_i32(stream.width);
        buf.put_i32(stream.height);
        buf.put_i32(stream.channels);
        buf.put_i32(stream.sample_rate);
        let language = stream.language.as_deref().unwrap_or("");
        buf.put_u8(language.len() as u8);
        buf.put_slice(language.as_bytes());
    }
    buf.to_vec()
}

/// aac/eng/2ch/44100 followed by h264 320x240
pub fn sample_container() -> Vec<u8> {
    build_container(&[
        SyntheticStream::audio(CODEC_AAC, Some("eng"), 2, 44100),
        SyntheticStream::video(CODEC_H264, 320, 240),
    ])
}

/// Engine for the synthetic format. Counts how many containers were released.
#[derive(Debug, Clone, Default)]
pub struct SyntheticEngine {
    pub released: Rc<Cell<usize>>,
}

/// Opened synthetic container
pub struct SyntheticContainer {
    source: BufferedSource,
    pending: BytesMut,
    declared: usize,
    streams: Vec<SyntheticStream>,
    discovered: bool,
    released: Rc<Cell<usize>>,
}

impl SyntheticContainer {
    /// Pull from the source until `n` bytes are pending. Returns false on
    /// end of input.
    fn fill(&mut self, n: usize) -> std::result::Result<bool, ReadError> {
        let mut scratch = [0u8; PULL_SIZE];
        while self.pending.len() < n {
            match self.source.read(&mut scratch)? {
                ReadOutcome::Bytes(read) => self.pending.put_slice(&scratch[..read]),
                ReadOutcome::EndOfInput => return Ok(false),
            }
        }
        Ok(true)
    }
}

impl ContainerEngine for SyntheticEngine {
    type Container = SyntheticContainer;

    fn open(&self, source: BufferedSource, _config: &ProbeConfig) -> Result<SyntheticContainer> {
        let mut container = SyntheticContainer {
            source,
            pending: BytesMut::new(),
            declared: 0,
            streams: Vec::new(),
            discovered: false,
            released: self.released.clone(),
        };

        if !container.fill(MAGIC.len() + 1)? {
            return Err(ProbeError::Open("truncated header".to_string()));
        }
        if &container.pending[..MAGIC.len()] != MAGIC {
            return Err(ProbeError::Open("unrecognized container".to_string()));
        }
        container.pending.advance(MAGIC.len());
        container.declared = container.pending.get_u8() as usize;
        Ok(container)
    }
}

impl Container for SyntheticContainer {
    type CodecId = u32;
    type Stream<'a> = &'a SyntheticStream;

    fn find_streams(&mut self) -> Result<()> {
        if self.discovered {
            return Ok(());
        }
        const FIXED: usize = 1 + 4 + 4 * 4 + 1;
        for index in 0..self.declared {
            if !self.fill(FIXED)? {
                return Err(ProbeError::Discovery("truncated stream table".to_string()));
            }
            let lang_len = self.pending[FIXED - 1] as usize;
            if !self.fill(FIXED + lang_len)? {
                return Err(ProbeError::Discovery("truncated language tag".to_string()));
            }

            let kind = kind_from_tag(self.pending.get_u8());
            let codec = self.pending.get_u32();
            let width = self.pending.get_i32();
            let height = self.pending.get_i32();
            let channels = self.pending.get_i32();
            let sample_rate = self.pending.get_i32();
            let lang_len = self.pending.get_u8() as usize;
            let lang = self.pending.split_to(lang_len);
            let language = (!lang.is_empty()).then(|| String::from_utf8_lossy(&lang).into_owned());

            self.streams.push(SyntheticStream {
                index,
                kind,
                codec,
                width,
                height,
                channels,
                sample_rate,
                language,
            });
        }
        self.discovered = true;
        Ok(())
    }

    fn streams(&self) -> Vec<&SyntheticStream> {
        self.streams.iter().collect()
    }

    fn format_name(&self) -> Option<String> {
        Some("synthetic".to_string())
    }
}

impl Drop for SyntheticContainer {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

impl StreamParams for &SyntheticStream {
    type CodecId = u32;

    fn index(&self) -> usize {
        self.index
    }
    fn media_kind(&self) -> MediaKind {
        self.kind
    }
    fn codec_id(&self) -> u32 {
        self.codec
    }
    fn width(&self) -> i32 {
        self.width
    }
    fn height(&self) -> i32 {
        self.height
    }
    fn channels(&self) -> i32 {
        self.channels
    }
    fn sample_rate(&self) -> i32 {
        self.sample_rate
    }
    fn metadata(&self, key: &str) -> Option<String> {
        match key {
            "language" => self.language.clone(),
            _ => None,
        }
    }
}

/// Registry for the synthetic codec ids
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticRegistry;

impl CodecRegistry for SyntheticRegistry {
    type Id = u32;

    fn lookup(&self, id: u32) -> Option<CodecDescriptor> {
        let (name, long_name) = match id {
            CODEC_H264 => ("h264", "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10"),
            CODEC_AAC => ("aac", "AAC (Advanced Audio Coding)"),
            CODEC_SUBRIP => ("subrip", "SubRip subtitle"),
            CODEC_BIN_DATA => ("bin_data", "binary data"),
            _ => return None,
        };
        Some(CodecDescriptor {
            name: name.to_string(),
            long_name: Some(long_name.to_string()),
        })
    }
}

/// Byte source that fails after handing out `good` bytes
pub struct FailingSource {
    data: Vec<u8>,
    pos: usize,
    good: usize,
}

impl FailingSource {
    pub fn new(data: Vec<u8>, good: usize) -> Self {
        Self { data, pos: 0, good }
    }
}

impl ByteSource for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, ReadError> {
        if self.pos >= self.good {
            return Err(ReadError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        let end = self.good.min(self.data.len()).min(self.pos + buf.len());
        let n = end.saturating_sub(self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..end]);
        self.pos += n;
        Ok(n)
    }
}

/// A 16-bit PCM WAV file with `frames` frames of silence
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: u32) -> Vec<u8> {
    let block_align = channels as u32 * 2;
    let data_len = frames * block_align;

    let mut buf = BytesMut::with_capacity(44 + data_len as usize);
    buf.put_slice(b"RIFF");
    buf.put_u32_le(36 + data_len);
    buf.put_slice(b"WAVE");
    buf.put_slice(b"fmt ");
    buf.put_u32_le(16);
    buf.put_u16_le(1); // PCM
    buf.put_u16_le(channels);
    buf.put_u32_le(sample_rate);
    buf.put_u32_le(sample_rate * block_align);
    buf.put_u16_le(block_align as u16);
    buf.put_u16_le(16);
    buf.put_slice(b"data");
    buf.put_u32_le(data_len);
    buf.put_bytes(0, data_len as usize);
    buf.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_layout() {
        let wav = wav_bytes(2, 44100, 10);
        assert_eq!(wav.len(), 44 + 40);
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
    }

    #[test]
    fn test_container_layout() {
        let bytes = build_container(&[SyntheticStream::subtitle(CODEC_SUBRIP, Some("eng"))]);
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes.len(), 5 + 22 + 3);
    }
}
