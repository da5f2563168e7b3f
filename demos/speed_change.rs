//! Streaming speed change example.
//!
//! Feeds a synthetic voiced signal through a [`picola::Stream`] in small
//! chunks, the way an audio callback would, and reports how long the result is
//! at a few playback speeds.
//!
//! Run with: cargo run --example speed_change

use std::f32::consts::PI;

use picola::{PitchEstimator, Stream};

fn main() {
    let sample_rate = 16000u32;

    // 2 seconds of a 160 Hz buzz with a couple of harmonics
    let total_samples = sample_rate as usize * 2;
    let input: Vec<f32> = (0..total_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * PI * 160.0 * t).sin()
                + 0.25 * (2.0 * PI * 320.0 * t).sin()
                + 0.1 * (2.0 * PI * 480.0 * t).sin()
        })
        .collect();

    println!("PICOLA Speed Change Demo");
    println!("Input: {} samples at {} Hz", input.len(), sample_rate);

    for speed in [0.5, 0.8, 1.25, 2.0] {
        let mut stream = Stream::new(speed, sample_rate).expect("failed to create stream");
        let estimator = PitchEstimator::from_bounds(stream.bounds());

        let chunk_size = 256;
        let mut output = Vec::with_capacity(input.len() * 2);
        let mut buf = vec![0.0f32; chunk_size];
        for chunk in input.chunks(chunk_size) {
            stream.write(chunk).expect("write failed");
            loop {
                let n = stream.read(&mut buf);
                if n == 0 {
                    break;
                }
                output.extend_from_slice(&buf[..n]);
            }
        }
        stream.flush().expect("flush failed");
        output.extend(stream.drain_output());

        let mid = output.len() / 2;
        let period = estimator.find_period(&output[mid..mid + estimator.window_len()]);
        println!(
            "  speed {:>4}: {:>6} samples ({:.2}s), latency {:.1}ms, pitch {:.1} Hz",
            speed,
            output.len(),
            output.len() as f64 / sample_rate as f64,
            stream.latency_secs() * 1000.0,
            sample_rate as f64 / period as f64
        );
    }
}
