use crate::core::types::SpeedParams;
use crate::error::{PicolaError, Result};
use crate::stretch::period::splice_lengths;

/// Default lowest detectable pitch in Hz.
pub const DEFAULT_MIN_PITCH_HZ: f64 = 65.0;
/// Default highest detectable pitch in Hz.
pub const DEFAULT_MAX_PITCH_HZ: f64 = 400.0;
/// The coarse period search decimates the window to roughly this rate.
pub const AMDF_DOWNSAMPLE_HZ: u32 = 11_025;
/// Relative half-width of the fine period search around the coarse estimate.
pub const AMDF_RANGE: f64 = 0.2;
/// Slowest speed accepted at any sample rate.
///
/// Low sample rates narrow this further, see [`PeriodBounds::check_speed`].
pub const MIN_SPEED: f64 = 0.01;
/// Fastest speed accepted at any sample rate.
pub const MAX_SPEED: f64 = 100.0;
/// Speeds within this distance of 1.0 bypass period processing.
pub const IDENTITY_EPSILON: f64 = 1e-6;

/// Returns true when `speed` is treated as unchanged playback.
#[inline]
pub fn is_identity_speed(speed: f64) -> bool {
    (speed - 1.0).abs() < IDENTITY_EPSILON
}

/// Validates a speed factor on its own.
pub fn validate_speed(speed: f64) -> Result<()> {
    if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(PicolaError::InvalidSpeed(format!(
            "speed must be between {} and {}, got {}",
            MIN_SPEED, MAX_SPEED, speed
        )));
    }
    Ok(())
}

/// Validates stream parameters.
pub fn validate_params(params: &SpeedParams) -> Result<()> {
    validate_speed(params.speed)?;
    if params.sample_rate == 0 {
        return Err(PicolaError::InvalidSampleRate(params.sample_rate));
    }
    let (min_hz, max_hz) = (params.min_pitch_hz, params.max_pitch_hz);
    if !min_hz.is_finite() || !max_hz.is_finite() || min_hz <= 0.0 || min_hz > max_hz {
        return Err(PicolaError::invalid_pitch_range(min_hz, max_hz));
    }
    PeriodBounds::from_params(params).check_speed(params.speed)
}

/// Period limits derived once from the sample rate and pitch range.
///
/// Always satisfies `0 < min_period <= max_period` and
/// `max_required == 2 * max_period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    /// Shortest candidate period in samples (highest pitch).
    pub min_period: usize,
    /// Longest candidate period in samples (lowest pitch).
    pub max_period: usize,
    /// Input window needed to evaluate one period.
    pub max_required: usize,
    /// Sample stride of the coarse period search.
    pub amdf_skip: usize,
}

impl PeriodBounds {
    /// Derives bounds from validated parameters.
    pub fn from_params(params: &SpeedParams) -> Self {
        let sample_rate = params.sample_rate as f64;
        let min_period = ((sample_rate / params.max_pitch_hz) as usize).max(1);
        let max_period = ((sample_rate / params.min_pitch_hz) as usize).max(min_period);
        let amdf_skip = (params.sample_rate / AMDF_DOWNSAMPLE_HZ).max(1) as usize;
        Self {
            min_period,
            max_period,
            max_required: 2 * max_period,
            amdf_skip,
        }
    }

    /// Checks that every period in range can be spliced at `speed`.
    ///
    /// The crossfade shrinks with the period, so the shortest period decides:
    /// it must still get at least one crossfade sample.
    pub fn check_speed(&self, speed: f64) -> Result<()> {
        if is_identity_speed(speed) {
            return Ok(());
        }
        let (new_samples, _) = splice_lengths(self.min_period, speed);
        if new_samples == 0 {
            return Err(PicolaError::InvalidSpeed(format!(
                "speed {} leaves no crossfade for a {}-sample period",
                speed, self.min_period
            )));
        }
        Ok(())
    }
}
