//! Test helpers and fixtures for canto integration tests.
//!
//! Synthetic signals with a known ground truth (pulse trains, sines,
//! silence) stand in for recorded speech: a band-limited pulse train has
//! the harmonic structure the estimators are built for, so F0 and voicing
//! results can be asserted exactly.

pub mod tolerances;

use canto::prelude::*;

/// Default test sample rate.
pub const TEST_SAMPLE_RATE: u32 = 16000;

/// Create an engine with default configuration.
pub fn test_engine() -> CantoEngine {
    CantoEngine::builder()
        .build()
        .expect("failed to create test engine")
}

/// Create an engine with a specific F0 method.
pub fn test_engine_with_method(method: F0Method) -> CantoEngine {
    CantoEngine::builder()
        .f0_method(method)
        .build()
        .expect("failed to create test engine")
}

/// Band-limited pulse train at `f0` Hz: all harmonics up to 0.45 * fs with
/// equal amplitude, normalized. The closest synthetic stand-in for a
/// voiced speech excitation.
pub fn pulse_train(f0: f64, sample_rate: u32, duration: f64) -> Vec<f64> {
    let fs = sample_rate as f64;
    let harmonics = (0.45 * fs / f0).floor() as usize;
    let n = (fs * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / fs;
            (1..=harmonics)
                .map(|k| (2.0 * std::f64::consts::PI * k as f64 * f0 * t).cos())
                .sum::<f64>()
                / harmonics as f64
        })
        .collect()
}

/// Pure sine at `frequency` Hz.
pub fn sine(frequency: f64, sample_rate: u32, duration: f64) -> Vec<f64> {
    let fs = sample_rate as f64;
    let n = (fs * duration) as usize;
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / fs).sin())
        .collect()
}

/// Zero samples.
pub fn silence(sample_rate: u32, duration: f64) -> Vec<f64> {
    vec![0.0; (sample_rate as f64 * duration) as usize]
}

/// RMS of a signal.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Peak amplitude of a signal.
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max)
}

/// Median F0 over the voiced frames of a contour; panics if none are voiced.
///
/// The median ignores the edge frames where the analysis window runs off
/// the signal, so it is the right statistic for round-trip pitch checks.
pub fn voiced_median_f0(f0: &[f64], vuv: &[bool]) -> f64 {
    let mut voiced: Vec<f64> = f0
        .iter()
        .zip(vuv)
        .filter(|(_, &v)| v)
        .map(|(&f, _)| f)
        .collect();
    assert!(!voiced.is_empty(), "no voiced frames in contour");
    voiced.sort_by(|a, b| a.partial_cmp(b).unwrap());
    voiced[voiced.len() / 2]
}

/// Fraction of frames marked voiced.
pub fn voiced_ratio(vuv: &[bool]) -> f64 {
    if vuv.is_empty() {
        return 0.0;
    }
    vuv.iter().filter(|&&v| v).count() as f64 / vuv.len() as f64
}
