//! Probe configuration

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};
use crate::source::DEFAULT_CAPACITY;

/// Accepted values of `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration passed into every probe session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Read buffer capacity of the byte source, in bytes
    pub buffer_capacity: usize,

    /// Abort reads that start later than this many seconds into the session
    pub read_timeout_secs: Option<u64>,

    /// Demuxer options, e.g. `probesize` or `analyzeduration`
    pub format_options: BTreeMap<String, String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            read_timeout_secs: None,
            format_options: BTreeMap::new(),
            log_level: "warn".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Read deadline as a `Duration`
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: ProbeConfig = toml::from_str(&content).map_err(|e| {
            ProbeError::Config(format!("invalid config file {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Parse a `key=value` demuxer option and add it
    pub fn push_format_option(&mut self, pair: &str) -> Result<()> {
        let (key, value) = pair
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| {
                ProbeError::Config(format!("format option must be key=value, got {:?}", pair))
            })?;
        self.format_options
            .insert(key.trim().to_string(), value.trim().to_string());
        Ok(())
    }

    /// Reject settings no session could run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(ProbeError::Config(
                "buffer_capacity must be at least 1 byte".to_string(),
            ));
        }
        if self.read_timeout_secs == Some(0) {
            return Err(ProbeError::Config(
                "read_timeout_secs must be positive".to_string(),
            ));
        }
        if self.format_options.keys().any(|k| k.is_empty()) {
            return Err(ProbeError::Config("empty format option name".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ProbeError::Config(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }
        Ok(())
    }
}
