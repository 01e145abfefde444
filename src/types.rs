use serde::Serialize;

/// Placeholder codec name for identifiers the registry does not know.
pub const UNKNOWN_CODEC: &str = "unknown";

/// Media kind of an elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    /// Data, attachment, or anything the demuxer could not classify
    Other,
}

/// Video stream attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoAttrs {
    pub width: u32,
    pub height: u32,
}

/// Audio stream attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioAttrs {
    pub channels: u32,
    pub sample_rate_hz: u32,
}

/// Resolved description of one elementary stream.
///
/// Records are owned snapshots: they stay valid after the container they were
/// read from has been closed. `video` is set exactly when `media_kind` is
/// `Video`, `audio` exactly when it is `Audio`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRecord {
    pub index: usize,
    pub media_kind: MediaKind,
    pub codec_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_long_name: Option<String>,
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoAttrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioAttrs>,
}

impl StreamRecord {
    /// Language tag, or the empty string when the stream declares none
    pub fn language_or_empty(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }
}
