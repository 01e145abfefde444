//! Byte sources - the forward-only input side of a probe session
//!
//! This module handles:
//! - The `ByteSource` capability (anything that can fill a slice with bytes)
//! - `BufferedSource`, a fixed-capacity buffer in front of a `ByteSource`
//! - Concrete origins: local files, remote URIs, in-memory bytes

pub mod reader;

use std::time::{Duration, Instant};

use crate::error::ReadError;

pub use reader::{open_locator, Locator, MemorySource, ReaderSource};

/// Default read buffer capacity in bytes
pub const DEFAULT_CAPACITY: usize = 8192;

/// A pull-based origin of bytes.
///
/// `read` fills `buf` from the front and returns how many bytes were written;
/// `Ok(0)` means the origin is exhausted. Implementations are forward-only.
pub trait ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        (**self).read(buf)
    }
}

/// Result of a successful `BufferedSource::read`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Bytes(usize),
    EndOfInput,
}

/// Fixed-capacity buffer reused across every pull from the origin.
#[derive(Debug)]
pub struct ByteChunk {
    data: Box<[u8]>,
    len: usize,
}

impl ByteChunk {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Maximum number of bytes the chunk holds
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Buffered, forward-only reader in front of an arbitrary `ByteSource`.
///
/// Single-owner: the cursor is stateful, so one instance belongs to exactly
/// one probe session.
pub struct BufferedSource {
    inner: Box<dyn ByteSource>,
    chunk: ByteChunk,
    pos: usize,
    eof: bool,
    total: u64,
    deadline: Option<(Instant, Duration)>,
}

impl BufferedSource {
    /// Wrap `source` with a read buffer of `capacity` bytes (minimum 1).
    pub fn new<S: ByteSource + 'static>(source: S, capacity: usize) -> Self {
        Self {
            inner: Box::new(source),
            chunk: ByteChunk::with_capacity(capacity.max(1)),
            pos: 0,
            eof: false,
            total: 0,
            deadline: None,
        }
    }

    /// Fail every read attempted more than `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    pub fn capacity(&self) -> usize {
        self.chunk.capacity()
    }

    /// Total bytes handed out so far
    pub fn bytes_read(&self) -> u64 {
        self.total
    }

    /// Copy the next bytes in source order into `out`.
    ///
    /// Returns at most `min(out.len(), capacity)` bytes. `EndOfInput` is
    /// sticky: once seen, the origin is never pulled again.
    pub fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome, ReadError> {
        if out.is_empty() {
            return Ok(ReadOutcome::Bytes(0));
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ReadError::DeadlineExceeded(timeout));
            }
        }

        if self.pos == self.chunk.len {
            if self.eof {
                return Ok(ReadOutcome::EndOfInput);
            }
            self.refill()?;
            if self.chunk.is_empty() {
                return Ok(ReadOutcome::EndOfInput);
            }
        }

        let available = &self.chunk.data[self.pos..self.chunk.len];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        self.total += n as u64;
        Ok(ReadOutcome::Bytes(n))
    }

    /// Drain the whole source into a vector. Used by tests and small inputs.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, ReadError> {
        let mut data = Vec::new();
        let mut scratch = vec![0u8; self.capacity()];
        while let ReadOutcome::Bytes(n) = self.read(&mut scratch)? {
            data.extend_from_slice(&scratch[..n]);
        }
        Ok(data)
    }

    fn refill(&mut self) -> Result<(), ReadError> {
        self.pos = 0;
        self.chunk.len = 0;
        let n = self.inner.read(&mut self.chunk.data)?;
        if n == 0 {
            self.eof = true;
            tracing::trace!("byte source exhausted after {} bytes", self.total);
        }
        self.chunk.len = n.min(self.chunk.capacity());
        Ok(())
    }
}

impl std::fmt::Debug for BufferedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedSource")
            .field("capacity", &self.chunk.capacity())
            .field("buffered", &(self.chunk.len - self.pos))
            .field("total", &self.total)
            .field("eof", &self.eof)
            .finish()
    }
}
