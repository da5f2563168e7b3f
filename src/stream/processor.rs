use crate::analysis::pitch::PitchEstimator;
use crate::core::buffer::SampleBuffer;
use crate::core::types::{Sample, SpeedParams};
use crate::error::Result;
use crate::stretch::params::{is_identity_speed, validate_speed, PeriodBounds};
use crate::stretch::period::PeriodResampler;

/// Streaming pitch-preserving speed changer for one channel of audio.
///
/// Samples written with [`write`](Stream::write) are queued until at least
/// [`latency_samples`](Stream::latency_samples) are available, then processed
/// one pitch period at a time. Finished audio is pulled with
/// [`read`](Stream::read) in FIFO order. At end of input call
/// [`flush`](Stream::flush) once and read out what is left.
///
/// All operations run to completion on the calling thread. The stream has no
/// internal locking: share it between threads only behind an external lock
/// such as a `Mutex`.
///
/// If `write` or `flush` returns an error the stream state is unspecified and
/// it should be dropped.
#[derive(Debug, Clone)]
pub struct Stream {
    speed: f64,
    sample_rate: u32,
    bounds: PeriodBounds,
    estimator: PitchEstimator,
    input_buffer: SampleBuffer,
    output_buffer: SampleBuffer,
    /// Input samples to pass through unchanged before the next period analysis.
    remaining_input_to_copy: usize,
    /// Output length owed for input written before the last speed change.
    owed_output: f64,
    /// Input samples written since the last speed change.
    written_at_speed: usize,
    /// Output samples handed out by `read`.
    total_read: usize,
}

impl Stream {
    /// Creates a stream with the given speed and sample rate and default pitch
    /// range.
    ///
    /// # Errors
    ///
    /// Returns an error if the speed or sample rate is invalid or the sample
    /// queues cannot be allocated.
    pub fn new(speed: f64, sample_rate: u32) -> Result<Self> {
        Self::with_params(SpeedParams::new(speed).with_sample_rate(sample_rate))
    }

    /// Creates a stream from full parameters.
    pub fn with_params(params: SpeedParams) -> Result<Self> {
        params.validate()?;
        let bounds = PeriodBounds::from_params(&params);
        let input_buffer = SampleBuffer::with_capacity(bounds.max_required)?;
        let output_buffer = SampleBuffer::with_capacity(bounds.max_required)?;
        log::debug!(
            "created stream: speed {}, {} Hz, periods {}..={}, window {}, coarse stride {}",
            params.speed,
            params.sample_rate,
            bounds.min_period,
            bounds.max_period,
            bounds.max_required,
            bounds.amdf_skip
        );
        Ok(Self {
            speed: params.speed,
            sample_rate: params.sample_rate,
            bounds,
            estimator: PitchEstimator::from_bounds(&bounds),
            input_buffer,
            output_buffer,
            remaining_input_to_copy: 0,
            owed_output: 0.0,
            written_at_speed: 0,
            total_read: 0,
        })
    }

    /// Feeds new samples into the stream.
    ///
    /// Any whole periods that can be processed are moved to the output queue;
    /// the rest stays queued for the next call.
    pub fn write(&mut self, samples: &[Sample]) -> Result<()> {
        if is_identity_speed(self.speed) {
            self.output_buffer.append(samples)?;
            self.written_at_speed += samples.len();
            return Ok(());
        }
        self.input_buffer.append(samples)?;
        self.written_at_speed += samples.len();
        if self.input_buffer.len() < self.bounds.max_required {
            return Ok(());
        }
        let position = self.process_queued()?;
        self.input_buffer.consume_front(position);
        Ok(())
    }

    /// Copies up to `dest.len()` finished samples into `dest`.
    ///
    /// Returns the number of samples copied; zero means nothing is ready yet.
    pub fn read(&mut self, dest: &mut [Sample]) -> usize {
        let n = self.output_buffer.pop_front(dest);
        self.total_read += n;
        n
    }

    /// Forces the buffered tail through the processor.
    ///
    /// The input queue is padded with silence so every queued sample is
    /// consumed. Unread output is then cut back so the stream has produced
    /// no more than `input / speed` samples in total, counted per speed
    /// segment when the speed changed along the way. After a flush the input
    /// queue is empty; read the remaining output before dropping the stream.
    pub fn flush(&mut self) -> Result<()> {
        if is_identity_speed(self.speed) {
            return Ok(());
        }
        let queued = self.input_buffer.len();
        if queued > 0 {
            self.input_buffer.append_zeros(self.bounds.max_required)?;
            self.process_queued()?;
            self.input_buffer.clear();
            self.remaining_input_to_copy = 0;
        }

        let expected = self.expected_output_len();
        let unread = self.output_buffer.len();
        let excess = (self.total_read + unread).saturating_sub(expected).min(unread);
        self.output_buffer.truncate(unread - excess);

        log::trace!(
            "flushed {} queued samples, {} samples expected in total, trimmed {}",
            queued,
            expected,
            excess
        );
        Ok(())
    }

    /// Output length the input written so far calls for.
    fn expected_output_len(&self) -> usize {
        (self.owed_output + self.written_at_speed as f64 / self.speed).round() as usize
    }

    /// Returns the number of samples ready to [`read`](Stream::read).
    #[inline]
    pub fn samples_available(&self) -> usize {
        self.output_buffer.len()
    }

    /// Reads every available sample into a new vector.
    pub fn drain_output(&mut self) -> Vec<Sample> {
        let mut out = vec![0.0; self.samples_available()];
        let n = self.read(&mut out);
        out.truncate(n);
        out
    }

    /// Returns the speed factor.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Changes the speed for subsequent processing.
    ///
    /// Already queued input is processed at the new speed. A pending verbatim
    /// copy from the previous speed is completed first.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        validate_speed(speed)?;
        self.bounds.check_speed(speed)?;
        // Queued input has not been processed yet, so it counts at the new speed.
        let queued = self.input_buffer.len();
        self.owed_output += self.written_at_speed.saturating_sub(queued) as f64 / self.speed;
        self.written_at_speed = queued;
        if is_identity_speed(speed) && !is_identity_speed(self.speed) {
            // Pass-through skips the input queue, so hand it over unchanged.
            self.output_buffer.append(self.input_buffer.as_slice())?;
            self.input_buffer.clear();
            self.remaining_input_to_copy = 0;
        }
        log::debug!("stream speed {} -> {}", self.speed, speed);
        self.speed = speed;
        Ok(())
    }

    /// Returns the sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the period limits derived at creation.
    #[inline]
    pub fn bounds(&self) -> &PeriodBounds {
        &self.bounds
    }

    /// Returns the number of input samples needed before output is produced.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.bounds.max_required
    }

    /// Returns the minimum latency in seconds.
    pub fn latency_secs(&self) -> f64 {
        self.latency_samples() as f64 / self.sample_rate as f64
    }

    /// Returns the number of input samples still waiting to be processed.
    #[inline]
    pub fn input_len(&self) -> usize {
        self.input_buffer.len()
    }

    /// Returns the capacity of the input queue.
    #[inline]
    pub fn input_capacity(&self) -> usize {
        self.input_buffer.capacity()
    }

    /// Returns the capacity of the output queue.
    #[inline]
    pub fn output_capacity(&self) -> usize {
        self.output_buffer.capacity()
    }

    /// Clears both queues, any pending verbatim copy and the length
    /// bookkeeping, as if the stream had just been created.
    pub fn reset(&mut self) {
        self.input_buffer.clear();
        self.output_buffer.clear();
        self.remaining_input_to_copy = 0;
        self.owed_output = 0.0;
        self.written_at_speed = 0;
        self.total_read = 0;
    }

    /// Runs the period loop over the input queue and returns how many input
    /// samples were consumed. Requires at least `max_required` queued samples.
    fn process_queued(&mut self) -> Result<usize> {
        let max_required = self.bounds.max_required;
        let num_samples = self.input_buffer.len();
        let resampler = PeriodResampler::new(self.speed);
        let mut position = 0;

        loop {
            let samples = &self.input_buffer.as_slice()[position..];
            if self.remaining_input_to_copy > 0 {
                let count = self.remaining_input_to_copy.min(max_required);
                self.output_buffer.append(&samples[..count])?;
                self.remaining_input_to_copy -= count;
                position += count;
            } else {
                let period = self.estimator.find_period(samples);
                let step = resampler.process(samples, period, &mut self.output_buffer)?;
                self.remaining_input_to_copy = step.remaining_input_to_copy;
                log::trace!(
                    "position {}: period {}, {} crossfade samples, advance {}",
                    position,
                    period,
                    step.new_samples,
                    step.advance
                );
                position += step.advance;
            }
            if position + max_required > num_samples {
                break;
            }
        }
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PicolaError;
    use std::f32::consts::PI;

    fn sine_wave(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_stream_bounds_at_creation() {
        let stream = Stream::new(2.0, 8000).unwrap();
        assert_eq!(stream.bounds().min_period, 20);
        assert_eq!(stream.bounds().max_period, 123);
        assert_eq!(stream.latency_samples(), 246);
        assert_eq!(stream.input_capacity(), 246);
        assert_eq!(stream.output_capacity(), 246);
        assert!((stream.latency_secs() - 246.0 / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn test_stream_rejects_bad_params() {
        assert!(matches!(
            Stream::new(0.0, 8000),
            Err(PicolaError::InvalidSpeed(_))
        ));
        assert!(matches!(
            Stream::new(1.5, 0),
            Err(PicolaError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn test_short_write_waits_for_more_input() {
        let mut stream = Stream::new(1.5, 8000).unwrap();
        stream.write(&[0.25; 100]).unwrap();
        assert_eq!(stream.samples_available(), 0);
        assert_eq!(stream.input_len(), 100);
    }

    #[test]
    fn test_identity_bypasses_input_queue() {
        let mut stream = Stream::new(1.0, 8000).unwrap();
        stream.write(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(stream.input_len(), 0);
        assert_eq!(stream.drain_output(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_driver_leaves_less_than_a_window_queued() {
        let mut stream = Stream::new(2.0, 8000).unwrap();
        stream.write(&vec![0.0; 4000]).unwrap();
        // Silence locks onto the 20 sample minimum period: 40 in, 20 out per step.
        assert_eq!(stream.samples_available(), 1880);
        assert_eq!(stream.input_len(), 240);
        assert!(stream.input_len() < stream.latency_samples());
    }

    #[test]
    fn test_copy_debt_is_paid_in_window_sized_steps() {
        // speed 1.01 leaves a debt of about 20 * 0.99 / 0.01 samples per period.
        let mut stream = Stream::new(1.01, 8000).unwrap();
        stream.write(&vec![0.0; 246]).unwrap();
        assert_eq!(stream.samples_available(), 20);
        assert_eq!(stream.input_len(), 206);

        stream.write(&vec![0.0; 2000]).unwrap();
        // Debt is copied out max_required at a time without any new analysis.
        assert_eq!(stream.samples_available(), 20 + 1968);
        assert_eq!(stream.input_len(), 206 + 2000 - 1968);
    }

    #[test]
    fn test_flush_empties_input() {
        let mut stream = Stream::new(0.75, 16000).unwrap();
        let input = sine_wave(220.0, 16000, 1234);
        stream.write(&input).unwrap();
        stream.flush().unwrap();
        assert_eq!(stream.input_len(), 0);
        let output = stream.drain_output();
        let expected = 1234.0 / 0.75;
        assert!(
            (output.len() as f64 - expected).abs() <= 246.0,
            "Expected ~{} samples, got {}",
            expected,
            output.len()
        );
    }

    #[test]
    fn test_flush_trims_padding_after_inserted_periods() {
        // One sample at 0.9 runs an insert step over a window that is almost
        // all padding. Only the single owed output sample may remain.
        let mut stream = Stream::new(0.9, 44100).unwrap();
        stream.write(&[0.5]).unwrap();
        stream.flush().unwrap();
        assert_eq!(stream.drain_output(), vec![0.5]);
    }

    #[test]
    fn test_flush_counts_samples_already_read() {
        let mut stream = Stream::new(0.75, 8000).unwrap();
        let input = sine_wave(200.0, 8000, 1000);
        stream.write(&input).unwrap();
        let early = stream.drain_output().len();
        assert!(early > 0);
        stream.flush().unwrap();
        let late = stream.drain_output().len();
        // round(1000 / 0.75)
        assert_eq!(early + late, 1333);
    }

    #[test]
    fn test_set_speed_rejects_unspliceable_speed() {
        let mut stream = Stream::new(1.5, 8000).unwrap();
        assert!(matches!(
            stream.set_speed(50.0),
            Err(PicolaError::InvalidSpeed(_))
        ));
        assert!((stream.speed() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_flush_on_empty_stream_is_noop() {
        let mut stream = Stream::new(1.5, 8000).unwrap();
        stream.flush().unwrap();
        assert_eq!(stream.samples_available(), 0);
    }

    #[test]
    fn test_set_speed_to_identity_passes_queue_through() {
        let mut stream = Stream::new(1.5, 8000).unwrap();
        stream.write(&[0.5; 50]).unwrap();
        stream.set_speed(1.0).unwrap();
        assert_eq!(stream.input_len(), 0);
        assert_eq!(stream.samples_available(), 50);
        stream.write(&[0.5; 10]).unwrap();
        assert_eq!(stream.samples_available(), 60);
    }

    #[test]
    fn test_set_speed_validates() {
        let mut stream = Stream::new(1.5, 8000).unwrap();
        assert!(stream.set_speed(f64::NAN).is_err());
        assert!((stream.speed() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_clears_queues() {
        let mut stream = Stream::new(0.5, 8000).unwrap();
        stream.write(&vec![0.3; 1000]).unwrap();
        assert!(stream.samples_available() > 0);
        stream.reset();
        assert_eq!(stream.samples_available(), 0);
        assert_eq!(stream.input_len(), 0);
    }
}
