use crate::error::{PicolaError, Result};
use crate::stretch::params::{validate_params, DEFAULT_MAX_PITCH_HZ, DEFAULT_MIN_PITCH_HZ};

/// A single audio sample (32-bit float, nominal range -1.0 to 1.0).
pub type Sample = f32;

/// Parameters controlling a speed-change stream.
///
/// ```
/// use picola::SpeedParams;
///
/// let params = SpeedParams::new(1.25)
///     .with_sample_rate(22050)
///     .with_pitch_range(80.0, 300.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedParams {
    /// Playback speed: >1.0 = faster (shorter), <1.0 = slower (longer).
    pub speed: f64,
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,
    /// Lowest pitch the period search will detect, in Hz (default: 65).
    pub min_pitch_hz: f64,
    /// Highest pitch the period search will detect, in Hz (default: 400).
    pub max_pitch_hz: f64,
}

impl SpeedParams {
    /// Create new parameters with the given speed and default settings.
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            sample_rate: 44100,
            min_pitch_hz: DEFAULT_MIN_PITCH_HZ,
            max_pitch_hz: DEFAULT_MAX_PITCH_HZ,
        }
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the pitch range searched for periods.
    pub fn with_pitch_range(mut self, min_hz: f64, max_hz: f64) -> Self {
        self.min_pitch_hz = min_hz;
        self.max_pitch_hz = max_hz;
        self
    }

    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        validate_params(self)
    }

    /// Expected output length for `input_len` samples at this speed.
    pub fn output_length(&self, input_len: usize) -> usize {
        (input_len as f64 / self.speed).round() as usize
    }

    /// Returns true when the speed is close enough to 1.0 to pass audio through.
    #[inline]
    pub fn is_identity(&self) -> bool {
        crate::stretch::params::is_identity_speed(self.speed)
    }
}

impl TryFrom<(f64, u32)> for SpeedParams {
    type Error = PicolaError;

    fn try_from((speed, sample_rate): (f64, u32)) -> Result<Self> {
        let params = SpeedParams::new(speed).with_sample_rate(sample_rate);
        params.validate()?;
        Ok(params)
    }
}
