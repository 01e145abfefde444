//! Integration testing module
//!
//! - Synthetic-engine tests of the probe core (ordering, buffering, errors,
//!   session lifecycle)
//! - End-to-end tests through FFmpeg with generated WAV inputs

pub mod fixtures;
