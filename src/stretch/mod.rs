pub mod params;
pub mod period;

pub use params::PeriodBounds;
pub use period::{PeriodMode, PeriodResampler, PeriodStep};
