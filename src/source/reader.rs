//! Concrete byte origins and input locator handling

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use bytes::{Buf, Bytes};

use super::{BufferedSource, ByteSource};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, ReadError, Result};

/// Adapts any `std::io::Read` (files, HTTP response bodies) to `ByteSource`
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, ReadError> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ReadError::Io(e)),
            }
        }
    }
}

/// In-memory byte origin
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, ReadError> {
        let n = buf.len().min(self.data.remaining());
        self.data.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }
}

/// Where the container bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Path(PathBuf),
    Remote(String),
}

impl Locator {
    /// Classify an input locator: `http(s)://` is remote, `file://` and plain
    /// strings are local paths, any other scheme is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ProbeError::Config("empty input locator".to_string()));
        }

        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Locator::Remote(input.to_string()));
        }
        if lower.starts_with("file://") {
            return Ok(Locator::Path(PathBuf::from(&input["file://".len()..])));
        }
        if let Some((scheme, _)) = input.split_once("://") {
            return Err(ProbeError::Config(format!(
                "unsupported input scheme: {}",
                scheme
            )));
        }

        Ok(Locator::Path(PathBuf::from(input)))
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Path(path) => write!(f, "{}", path.display()),
            Locator::Remote(url) => f.write_str(url),
        }
    }
}

/// Open the origin named by `locator` and wrap it in a `BufferedSource`
/// sized and timed according to `config`.
pub fn open_locator(locator: &Locator, config: &ProbeConfig) -> Result<BufferedSource> {
    let source = match locator {
        Locator::Path(path) => {
            let file = File::open(path).map_err(ReadError::Io)?;
            tracing::debug!("Opened input file: {:?}", path);
            BufferedSource::new(ReaderSource::new(file), config.buffer_capacity)
        }
        Locator::Remote(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(config.read_timeout())
                .build()
                .map_err(ReadError::from)?;
            let response = client
                .get(url.as_str())
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(ReadError::from)?;
            tracing::debug!(
                "Fetching remote input: {} (status {})",
                url,
                response.status()
            );
            BufferedSource::new(ReaderSource::new(response), config.buffer_capacity)
        }
    };

    Ok(match config.read_timeout() {
        Some(timeout) => source.with_timeout(timeout),
        None => source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_locator_parse() {
        assert_eq!(
            Locator::parse("movie.mkv").unwrap(),
            Locator::Path(PathBuf::from("movie.mkv"))
        );
        assert_eq!(
            Locator::parse("file:///tmp/a.mp4").unwrap(),
            Locator::Path(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(
            Locator::parse("HTTPS://example.com/a.m4v").unwrap(),
            Locator::Remote("HTTPS://example.com/a.m4v".to_string())
        );
    }

    #[test]
    fn test_locator_rejects_unknown_scheme() {
        assert!(matches!(
            Locator::parse("rtmp://host/live"),
            Err(ProbeError::Config(_))
        ));
        assert!(matches!(Locator::parse("  "), Err(ProbeError::Config(_))));
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new(b"hello".to_vec());
        let mut buf = [0u8; 3];
        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"container bytes").unwrap();

        let locator = Locator::Path(file.path().to_path_buf());
        let config = ProbeConfig {
            buffer_capacity: 4,
            ..Default::default()
        };
        let mut source = open_locator(&locator, &config).unwrap();
        assert_eq!(source.capacity(), 4);
        assert_eq!(source.read_to_end().unwrap(), b"container bytes");
    }

    #[test]
    fn test_open_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let locator = Locator::Path(dir.path().join("missing.mp4"));
        let err = open_locator(&locator, &ProbeConfig::default()).unwrap_err();
        assert!(matches!(err, ProbeError::Read(ReadError::Io(_))));
    }
}
