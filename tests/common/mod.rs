#![allow(dead_code)]

use std::f32::consts::PI;

use picola::Stream;
use rustfft::{num_complex::Complex, FftPlanner};

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

pub fn gen_two_tone(
    freq_a: f32,
    amp_a: f32,
    freq_b: f32,
    amp_b: f32,
    sr: u32,
    n: usize,
) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = i as f32 / sr as f32;
            amp_a * (2.0 * PI * freq_a * t).sin() + amp_b * (2.0 * PI * freq_b * t).sin()
        })
        .collect()
}

/// Glottal-pulse style voiced signal: a decaying pulse every `period` samples.
pub fn gen_pulse_train(period: usize, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let k = (i % period) as f32;
            0.8 * (-k / 6.0).exp() * (2.0 * PI * k / period as f32 * 3.0).cos()
        })
        .collect()
}

/// Deterministic pseudo-random noise in [-amp, amp].
pub fn gen_noise(n: usize, amp: f32, seed: u32) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32 * 2.0 - 1.0) * amp
        })
        .collect()
}

pub fn rms(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Writes `input` in chunks of `chunk_size`, flushes, and collects everything
/// read back in reads of `read_size`.
pub fn run_stream(
    stream: &mut Stream,
    input: &[f32],
    chunk_size: usize,
    read_size: usize,
) -> Vec<f32> {
    let mut output = Vec::new();
    let mut buf = vec![0.0f32; read_size];
    for chunk in input.chunks(chunk_size) {
        stream.write(chunk).expect("write should succeed");
        loop {
            let n = stream.read(&mut buf);
            if n == 0 {
                break;
            }
            output.extend_from_slice(&buf[..n]);
        }
    }
    stream.flush().expect("flush should succeed");
    loop {
        let n = stream.read(&mut buf);
        if n == 0 {
            break;
        }
        output.extend_from_slice(&buf[..n]);
    }
    output
}

/// Frequency of the strongest FFT bin (excluding DC), in Hz.
pub fn spectral_peak_hz(signal: &[f32], sr: u32) -> f64 {
    let n = signal.len().next_power_of_two();
    let mut buf: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
    buf.resize(n, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::<f32>::new();
    planner.plan_fft_forward(n).process(&mut buf);

    let (peak_bin, _) = buf[1..n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm()))
        .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
    peak_bin as f64 * sr as f64 / n as f64
}

/// Largest absolute difference between neighbouring samples.
pub fn max_adjacent_diff(signal: &[f32]) -> f32 {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}
