//! Probe session - owns one container from open to close
//!
//! A session walks `Unopened → Opened → StreamsDiscovered → Closed`.
//! `Opening` is only held for the duration of the `open` call. A failed open
//! goes straight to `Closed`, as does a failed discovery. The
//! container is released exactly once: on `close`, on a failure, or on drop.

use std::fmt;

use crate::config::ProbeConfig;
use crate::engine::{CodecRegistry, Container, ContainerEngine, StreamParams};
use crate::error::{ProbeError, Result};
use crate::resolve::{Resolution, StreamDescriptorResolver};
use crate::source::BufferedSource;

/// Codec identifier type of an engine's containers
pub type CodecIdOf<E> = <<E as ContainerEngine>::Container as Container>::CodecId;

/// Borrowed stream handle of an engine's containers
pub type StreamHandle<'a, E> = <<E as ContainerEngine>::Container as Container>::Stream<'a>;

/// Lifecycle state of a probe session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Unopened,
    Opening,
    Opened,
    StreamsDiscovered,
    Closed,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeState::Unopened => "unopened",
            ProbeState::Opening => "opening",
            ProbeState::Opened => "opened",
            ProbeState::StreamsDiscovered => "streams-discovered",
            ProbeState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One probe of one input
pub struct ProbeSession<E: ContainerEngine> {
    engine: E,
    config: ProbeConfig,
    state: ProbeState,
    container: Option<E::Container>,
}

impl<E: ContainerEngine> ProbeSession<E> {
    pub fn new(engine: E, config: ProbeConfig) -> Self {
        Self {
            engine,
            config,
            state: ProbeState::Unopened,
            container: None,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Open the container behind `source` and parse its header.
    pub fn open(&mut self, source: BufferedSource) -> Result<()> {
        if self.state != ProbeState::Unopened {
            return Err(ProbeError::InvalidState {
                expected: "unopened",
                actual: self.state,
            });
        }

        self.state = ProbeState::Opening;
        match self.engine.open(source, &self.config) {
            Ok(container) => {
                self.container = Some(container);
                self.state = ProbeState::Opened;
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Open failed: {}", e);
                self.state = ProbeState::Closed;
                Err(e)
            }
        }
    }

    /// Discover the elementary streams, in container order.
    ///
    /// The first call may read past the header. Later calls return the same
    /// list without touching the source again.
    pub fn discover_streams(&mut self) -> Result<Vec<StreamHandle<'_, E>>> {
        match self.state {
            ProbeState::Opened => {
                let container = self.container.as_mut().ok_or(ProbeError::InvalidState {
                    expected: "opened",
                    actual: ProbeState::Closed,
                })?;
                if let Err(e) = container.find_streams() {
                    self.close();
                    return Err(e);
                }
                self.state = ProbeState::StreamsDiscovered;
                if let Some(container) = self.container.as_ref() {
                    tracing::info!(
                        "Discovered {} streams (format={})",
                        container.streams().len(),
                        container.format_name().unwrap_or_default()
                    );
                }
            }
            ProbeState::StreamsDiscovered => {}
            actual => {
                return Err(ProbeError::InvalidState {
                    expected: "opened",
                    actual,
                })
            }
        }

        let misordered = self.container.as_ref().and_then(|container| {
            container
                .streams()
                .iter()
                .enumerate()
                .find(|(position, stream)| stream.index() != *position)
                .map(|(position, stream)| (position, stream.index()))
        });
        if let Some((position, index)) = misordered {
            self.close();
            return Err(ProbeError::Discovery(format!(
                "stream table out of order: stream at position {} reports index {}",
                position, index
            )));
        }

        let container = self.container.as_ref().ok_or(ProbeError::InvalidState {
            expected: "streams-discovered",
            actual: ProbeState::Closed,
        })?;
        Ok(container.streams())
    }

    /// Discover (if needed) and resolve every stream.
    pub fn resolve<R>(&mut self, resolver: &StreamDescriptorResolver<R>) -> Result<Resolution>
    where
        R: CodecRegistry<Id = CodecIdOf<E>>,
    {
        let streams = self.discover_streams()?;
        Ok(resolver.resolve_all(&streams))
    }

    /// Name of the detected container format, once opened
    pub fn format_name(&self) -> Option<String> {
        self.container.as_ref().and_then(|c| c.format_name())
    }

    /// Release the container. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(container) = self.container.take() {
            drop(container);
            tracing::debug!("Container closed");
        }
        self.state = ProbeState::Closed;
    }
}

impl<E: ContainerEngine> Drop for ProbeSession<E> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Run a complete session: open, discover, resolve, close.
///
/// The container is closed on every path before this returns.
pub fn probe<E, R>(
    engine: E,
    resolver: &StreamDescriptorResolver<R>,
    source: BufferedSource,
    config: ProbeConfig,
) -> Result<Resolution>
where
    E: ContainerEngine,
    R: CodecRegistry<Id = CodecIdOf<E>>,
{
    let mut session = ProbeSession::new(engine, config);
    session.open(source)?;
    let resolution = session.resolve(resolver);
    session.close();
    resolution
}
