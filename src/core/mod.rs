//! Core sample types, stream parameters and the growable sample queue.

pub mod buffer;
pub mod types;

pub use buffer::SampleBuffer;
pub use types::*;
