#![forbid(unsafe_code)]
//! Pitch-preserving speed change for mono audio.
//!
//! `picola` speeds audio up or slows it down without changing its pitch by
//! working on whole pitch periods in the time domain: the local period is found
//! with an AMDF search, then one period is either blended away (faster) or
//! repeated with a crossfade (slower). Everything runs on a single channel of
//! `f32` samples; callers with interleaved audio run one stream per channel.
//!
//! # Quick Start
//!
//! ```
//! use picola::SpeedParams;
//!
//! // 1 second of 220 Hz sine at 16 kHz
//! let input: Vec<f32> = (0..16000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16000.0).sin())
//!     .collect();
//!
//! let params = SpeedParams::new(2.0).with_sample_rate(16000);
//! let output = picola::change_speed(&input, &params).unwrap();
//! assert!(output.len() < input.len()); // ~half as long
//! ```
//!
//! # Streaming
//!
//! For chunked input, drive a [`Stream`] directly:
//!
//! ```
//! use picola::Stream;
//!
//! let mut stream = Stream::new(0.8, 22050).unwrap();
//! let mut out = vec![0.0f32; 1024];
//! for chunk in vec![0.0f32; 8192].chunks(512) {
//!     stream.write(chunk).unwrap();
//!     while stream.read(&mut out) > 0 {
//!         // hand `out` to the audio sink
//!     }
//! }
//! stream.flush().unwrap();
//! let tail = stream.drain_output();
//! # let _ = tail;
//! ```

pub mod analysis;
pub mod core;
pub mod error;
pub mod stream;
pub mod stretch;

pub use analysis::pitch::PitchEstimator;
pub use crate::core::buffer::SampleBuffer;
pub use crate::core::types::{Sample, SpeedParams};
pub use error::{PicolaError, Result};
pub use stream::Stream;
pub use stretch::params::PeriodBounds;

/// Changes the speed of a complete mono signal in one call.
///
/// Runs a fresh [`Stream`] over `input`, flushes it and returns everything it
/// produced. The output holds roughly `input.len() / params.speed` samples.
///
/// # Errors
///
/// Returns an error if `params` is invalid or a sample queue cannot grow.
///
/// # Example
///
/// ```
/// use picola::SpeedParams;
///
/// let input = vec![0.0f32; 8000];
/// let params = SpeedParams::new(0.5).with_sample_rate(8000);
/// let output = picola::change_speed(&input, &params).unwrap();
/// assert!((output.len() as i64 - 16000).abs() < 200);
/// ```
pub fn change_speed(input: &[Sample], params: &SpeedParams) -> Result<Vec<Sample>> {
    let mut stream = Stream::with_params(params.clone())?;
    if input.is_empty() {
        return Ok(vec![]);
    }
    stream.write(input)?;
    stream.flush()?;
    Ok(stream.drain_output())
}
