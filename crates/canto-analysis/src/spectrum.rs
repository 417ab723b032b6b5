//! Crate-internal spectral helpers shared by the estimators.

use canto_core::dsp::{extract_centered, hann_window, interp_at};
use rustfft::num_complex::Complex;
use rustfft::Fft;
use std::sync::Arc;

/// Extract a Hann-windowed segment of `2 * half_len + 1` samples centered on
/// `center_time`, zero-padded outside the signal.
///
/// The window-weighted mean is removed before windowing so DC leakage does
/// not masquerade as low-frequency energy.
pub(crate) fn windowed_segment(
    x: &[f64],
    sample_rate: f64,
    center_time: f64,
    half_len: usize,
) -> Vec<f64> {
    let len = 2 * half_len + 1;
    let center = (center_time * sample_rate).round() as isize;
    let mut seg = extract_centered(x, center, len);
    let window = hann_window(len);
    let window_sum: f64 = window.iter().sum();
    let mean = seg
        .iter()
        .zip(&window)
        .map(|(s, w)| s * w)
        .sum::<f64>()
        / window_sum;
    for (s, w) in seg.iter_mut().zip(&window) {
        *s = (*s - mean) * w;
    }
    seg
}

/// Complex spectrum of a (windowed) segment zero-padded to `fft_size`.
pub(crate) fn complex_spectrum(
    fft: &Arc<dyn Fft<f64>>,
    seg: &[f64],
    fft_size: usize,
) -> Vec<Complex<f64>> {
    debug_assert!(seg.len() <= fft_size);
    let mut buffer = vec![Complex::new(0.0, 0.0); fft_size];
    for (b, &s) in buffer.iter_mut().zip(seg) {
        b.re = s;
    }
    fft.process(&mut buffer);
    buffer
}

/// Full-length power spectrum of a segment.
pub(crate) fn power_spectrum(fft: &Arc<dyn Fft<f64>>, seg: &[f64], fft_size: usize) -> Vec<f64> {
    complex_spectrum(fft, seg, fft_size)
        .iter()
        .map(|c| c.norm_sqr())
        .collect()
}

/// Interpolated power at an arbitrary frequency, clamped to [0, Nyquist].
pub(crate) fn power_at(p: &[f64], freq: f64, sample_rate: f64) -> f64 {
    let n = p.len();
    let half = n / 2;
    let pos = (freq / sample_rate * n as f64).clamp(0.0, half as f64);
    interp_at(&p[..=half], pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    #[test]
    fn test_power_peaks_at_signal_frequency() {
        let fs = 16000.0;
        let x: Vec<f64> = (0..16000)
            .map(|i| (2.0 * std::f64::consts::PI * 400.0 * i as f64 / fs).sin())
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(2048);
        let seg = windowed_segment(&x, fs, 0.5, 512);
        let p = power_spectrum(&fft, &seg, 2048);

        assert!(power_at(&p, 400.0, fs) > 100.0 * power_at(&p, 600.0, fs));
        assert!(power_at(&p, 400.0, fs) > 100.0 * power_at(&p, 200.0, fs));
    }
}
