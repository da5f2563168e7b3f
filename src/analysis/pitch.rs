//! Pitch period estimation using the Average Magnitude Difference Function.

use crate::core::types::Sample;
use crate::stretch::params::{PeriodBounds, AMDF_RANGE};

/// Two-pass AMDF pitch period estimator.
///
/// The first pass walks the whole period range on a decimated grid; the second
/// refines the estimate at full resolution within [`AMDF_RANGE`] of it.
#[derive(Debug, Clone, Copy)]
pub struct PitchEstimator {
    min_period: usize,
    max_period: usize,
    skip: usize,
}

impl PitchEstimator {
    /// Creates an estimator searching `[min_period, max_period]` with a coarse
    /// stride of `skip` samples.
    pub fn new(min_period: usize, max_period: usize, skip: usize) -> Self {
        let min_period = min_period.max(1);
        Self {
            min_period,
            max_period: max_period.max(min_period),
            skip: skip.max(1),
        }
    }

    /// Creates an estimator from derived stream bounds.
    pub fn from_bounds(bounds: &PeriodBounds) -> Self {
        Self::new(bounds.min_period, bounds.max_period, bounds.amdf_skip)
    }

    /// Samples a window must hold for [`find_period`](Self::find_period).
    #[inline]
    pub fn window_len(&self) -> usize {
        2 * self.max_period
    }

    /// Returns the most periodic lag of `samples` in samples.
    ///
    /// `samples` must hold at least [`window_len`](Self::window_len) samples.
    pub fn find_period(&self, samples: &[Sample]) -> usize {
        debug_assert!(samples.len() >= self.window_len());
        let coarse = find_period_in_range(samples, self.min_period, self.max_period, self.skip);
        if self.skip == 1 {
            return coarse;
        }
        let low = ((coarse as f64 * (1.0 - AMDF_RANGE)) as usize).max(self.min_period);
        let high = ((coarse as f64 * (1.0 + AMDF_RANGE)) as usize).min(self.max_period);
        find_period_in_range(samples, low, high, 1)
    }
}

/// Finds the lag in `[min_period, max_period]` whose shifted self-difference
/// is smallest, stepping both the lag and the compared samples by `skip`.
///
/// Ties keep the earliest (shortest) lag.
pub fn find_period_in_range(
    samples: &[Sample],
    min_period: usize,
    max_period: usize,
    skip: usize,
) -> usize {
    let skip = skip.max(1);
    let mut best_period = 0;
    let mut min_diff = 0.0f64;

    for period in (min_period..=max_period).step_by(skip) {
        if period == 0 {
            continue;
        }
        let diff = average_magnitude_difference(samples, period, skip);
        if best_period == 0 || diff < min_diff {
            min_diff = diff;
            best_period = period;
        }
    }
    best_period
}

/// Mean absolute difference between `samples` and itself shifted by `period`,
/// sampled every `skip` samples over the first `period` samples.
#[inline]
fn average_magnitude_difference(samples: &[Sample], period: usize, skip: usize) -> f64 {
    let total: f64 = samples[..period]
        .iter()
        .zip(&samples[period..2 * period])
        .step_by(skip)
        .map(|(&a, &b)| (a - b).abs() as f64)
        .sum();
    total / period as f64
}
