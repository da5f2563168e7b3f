//! Error types for the picola crate.

use std::collections::TryReserveError;

use thiserror::Error;

/// Convenience alias for results carrying a [`PicolaError`].
pub type Result<T> = std::result::Result<T, PicolaError>;

/// Errors that can occur while creating or driving a speed-change stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PicolaError {
    /// A sample queue could not grow to hold the requested number of samples.
    ///
    /// The stream that reported this is in an unspecified state and should be
    /// dropped.
    #[error("failed to grow sample buffer to {requested} samples: {source}")]
    AllocationFailed {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
    /// Speed factor is not finite or lies outside the supported range.
    #[error("invalid speed: {0}")]
    InvalidSpeed(String),
    /// Sample rate must be non-zero.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
    /// Pitch search range is empty or not finite.
    #[error("invalid pitch range: {min_hz} Hz to {max_hz} Hz")]
    InvalidPitchRange { min_hz: String, max_hz: String },
    /// A splice step would have written no output samples.
    #[error("splicing a {period}-sample period at speed {speed} produces no output")]
    EmptySplice { period: usize, speed: String },
}

impl PicolaError {
    pub(crate) fn invalid_pitch_range(min_hz: f64, max_hz: f64) -> Self {
        PicolaError::InvalidPitchRange {
            min_hz: min_hz.to_string(),
            max_hz: max_hz.to_string(),
        }
    }

    pub(crate) fn empty_splice(period: usize, speed: f64) -> Self {
        PicolaError::EmptySplice {
            period,
            speed: speed.to_string(),
        }
    }
}
