//! Streaming speed change over chunked input.

pub mod processor;

pub use processor::Stream;
