//! Signal analysis used to drive period splicing.

pub mod pitch;

pub use pitch::{find_period_in_range, PitchEstimator};
