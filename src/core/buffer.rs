//! Growable FIFO sample queue used for the stream's input and output.

use crate::core::types::Sample;
use crate::error::{PicolaError, Result};

/// Growable sample queue with an explicit used length and capacity.
///
/// Samples are appended at the back and removed from the front by shifting the
/// remainder down to index 0. Capacity grows geometrically and never shrinks,
/// so a stream in steady state stops allocating once its queues have settled.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    data: Vec<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Creates an empty buffer with room for `cap` samples.
    pub fn with_capacity(cap: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(cap)
            .map_err(|source| PicolaError::AllocationFailed {
                requested: cap,
                source,
            })?;
        Ok(Self {
            data,
            capacity: cap,
        })
    }

    /// Returns the number of samples currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the logical capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when no samples are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the queued samples, oldest first.
    #[inline]
    pub fn as_slice(&self) -> &[Sample] {
        &self.data
    }

    /// Drops all queued samples. Capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Shortens the queue to `len` samples, dropping from the back.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Makes room for `additional` more samples.
    ///
    /// On failure the queued samples and length are left untouched.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.len() + additional;
        if needed <= self.capacity {
            return Ok(());
        }
        let new_capacity = self.capacity + (self.capacity >> 1) + additional;
        let room = new_capacity - self.data.len();
        self.data
            .try_reserve_exact(room)
            .map_err(|source| {
                log::warn!(
                    "sample buffer failed to grow from {} to {} samples",
                    self.capacity,
                    new_capacity
                );
                PicolaError::AllocationFailed {
                    requested: new_capacity,
                    source,
                }
            })?;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Appends `samples` at the back, growing first if needed.
    pub fn append(&mut self, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }
        self.reserve(samples.len())?;
        self.data.extend_from_slice(samples);
        Ok(())
    }

    /// Appends `n` zero samples.
    pub fn append_zeros(&mut self, n: usize) -> Result<()> {
        self.reserve(n)?;
        self.data.resize(self.data.len() + n, 0.0);
        Ok(())
    }

    /// Appends `n` samples produced by `f`, called with indices `0..n`.
    pub fn append_with<F>(&mut self, n: usize, f: F) -> Result<()>
    where
        F: FnMut(usize) -> Sample,
    {
        self.reserve(n)?;
        self.data.extend((0..n).map(f));
        Ok(())
    }

    /// Removes the first `n` samples, moving the rest to the front.
    pub fn consume_front(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let n = n.min(self.data.len());
        self.data.drain(..n);
    }

    /// Copies up to `dest.len()` samples from the front into `dest` and
    /// removes them from the queue.
    ///
    /// Returns the number of samples copied. Zero means nothing is queued.
    pub fn pop_front(&mut self, dest: &mut [Sample]) -> usize {
        let count = dest.len().min(self.data.len());
        if count == 0 {
            return 0;
        }
        dest[..count].copy_from_slice(&self.data[..count]);
        self.consume_front(count);
        count
    }
}
