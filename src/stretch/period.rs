//! Period-level splicing: drop or duplicate one pitch period with a crossfade.

use crate::core::buffer::SampleBuffer;
use crate::core::types::Sample;
use crate::error::{PicolaError, Result};

/// Which way a period is spliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodMode {
    /// Speed-up: one period is blended away.
    Skip,
    /// Slow-down: one period is played twice.
    Insert,
}

/// Outcome of splicing one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodStep {
    /// Length of the crossfade written to the output.
    pub new_samples: usize,
    /// Input samples consumed by this step.
    pub advance: usize,
    /// Input samples to pass through verbatim before the next analysis.
    pub remaining_input_to_copy: usize,
}

/// Splices whole pitch periods to change speed without changing pitch.
///
/// Each call looks at a window starting at the current input position and
/// appends the spliced audio to the output queue. The caller tracks the input
/// position and the verbatim-copy debt reported in [`PeriodStep`].
#[derive(Debug, Clone, Copy)]
pub struct PeriodResampler {
    speed: f64,
}

impl PeriodResampler {
    /// Creates a resampler for the given speed (must not be 1.0).
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    /// Returns the speed factor.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Returns whether periods are skipped or inserted at this speed.
    #[inline]
    pub fn mode(&self) -> PeriodMode {
        if self.speed > 1.0 {
            PeriodMode::Skip
        } else {
            PeriodMode::Insert
        }
    }

    /// Splices one `period` found at the start of `window` into `output`.
    ///
    /// `window` must hold at least `2 * period` samples.
    pub fn process(
        &self,
        window: &[Sample],
        period: usize,
        output: &mut SampleBuffer,
    ) -> Result<PeriodStep> {
        match self.mode() {
            PeriodMode::Skip => skip_period(window, period, self.speed, output),
            PeriodMode::Insert => insert_period(window, period, self.speed, output),
        }
    }
}

/// Returns the crossfade length and the verbatim-copy debt for splicing one
/// `period` at `speed`.
///
/// Both lengths grow with `period`, so a speed that yields a non-empty
/// crossfade at the shortest period does so for every longer one.
pub fn splice_lengths(period: usize, speed: f64) -> (usize, usize) {
    let period_f = period as f64;
    if speed > 1.0 {
        if speed >= 2.0 {
            ((period_f / (speed - 1.0)) as usize, 0)
        } else {
            (period, (period_f * (2.0 - speed) / (speed - 1.0)) as usize)
        }
    } else if speed < 0.5 {
        ((period_f * speed / (1.0 - speed)) as usize, 0)
    } else {
        (period, (period_f * (2.0 * speed - 1.0) / (1.0 - speed)) as usize)
    }
}

/// Drops one period, blending its start into the following period.
///
/// # Errors
///
/// Returns [`PicolaError::EmptySplice`] when `speed` is too high for the
/// crossfade to hold a single sample at this period.
pub fn skip_period(
    window: &[Sample],
    period: usize,
    speed: f64,
    output: &mut SampleBuffer,
) -> Result<PeriodStep> {
    let (new_samples, remaining) = splice_lengths(period, speed);
    if new_samples == 0 {
        return Err(PicolaError::empty_splice(period, speed));
    }

    let scale = 1.0 / new_samples as f64;
    output.append_with(new_samples, |t| {
        let a = window[t] as f64 * (new_samples - t) as f64;
        let b = window[t + period] as f64 * t as f64;
        (scale * (a + b)) as Sample
    })?;

    Ok(PeriodStep {
        new_samples,
        advance: period + new_samples,
        remaining_input_to_copy: remaining,
    })
}

/// Repeats one period: the period is copied as-is, then blended back into the
/// following period.
///
/// # Errors
///
/// Returns [`PicolaError::EmptySplice`] when `speed` is too low for the
/// crossfade to hold a single sample, which would stall the input cursor.
pub fn insert_period(
    window: &[Sample],
    period: usize,
    speed: f64,
    output: &mut SampleBuffer,
) -> Result<PeriodStep> {
    let (new_samples, remaining) = splice_lengths(period, speed);
    if new_samples == 0 {
        return Err(PicolaError::empty_splice(period, speed));
    }

    output.reserve(period + new_samples)?;
    output.append(&window[..period])?;
    let scale = 1.0 / new_samples as f64;
    output.append_with(new_samples, |t| {
        let a = window[t] as f64 * t as f64;
        let b = window[t + period] as f64 * (new_samples - t) as f64;
        (scale * (a + b)) as Sample
    })?;

    Ok(PeriodStep {
        new_samples,
        advance: new_samples,
        remaining_input_to_copy: remaining,
    })
}
