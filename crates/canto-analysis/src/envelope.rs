//! Spectral envelope estimation.
//!
//! Per frame: a pitch-adaptive Hann window of three periods (a fixed
//! pseudo-period when unvoiced) is transformed, the power spectrum is
//! smoothed along the frequency axis with a width tied to the local F0, and
//! the residual harmonic ripple is removed by liftering in the cepstral
//! domain. The result is a smooth, harmonic-free estimate of the vocal-tract
//! envelope, strictly positive in every bin.
//!
//! The complex pitch-synchronous spectrum of every frame is kept alongside
//! the envelope for inspection.

use crate::spectrum::{complex_spectrum, windowed_segment};
use canto_core::{AnalysisConfig, Error, F0Contour, Result, DEFAULT_F0, SAFE_GUARD_MINIMUM};
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Underflow guard on the reconstructed envelope.
const ENVELOPE_FLOOR: f64 = 1e-20;

/// Result of envelope estimation.
#[derive(Debug, Clone)]
pub struct EnvelopeEstimate {
    /// FFT size shared by both spectrograms of the bundle.
    pub fft_size: usize,
    /// Smoothed power envelope, frames x (fft_size / 2 + 1), all values > 0.
    pub spectrogram: Vec<Vec<f64>>,
    /// Complex pitch-synchronous spectrogram, same frame count.
    pub ps_spectrogram: Vec<Vec<Complex<f64>>>,
}

/// Estimate the spectral envelope along an F0 contour.
pub fn estimate(
    x: &[f64],
    sample_rate: u32,
    contour: &F0Contour,
    config: &AnalysisConfig,
) -> Result<EnvelopeEstimate> {
    config.validate()?;
    contour.validate()?;
    if sample_rate == 0 {
        return Err(Error::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    if x.is_empty() {
        return Err(Error::InsufficientData { needed: 1, got: 0 });
    }

    let fs = sample_rate as f64;
    let fft_size = config.fft_size_for(sample_rate);
    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let rows: Vec<(Vec<f64>, Vec<Complex<f64>>)> = contour
        .temporal_positions
        .par_iter()
        .zip(&contour.f0)
        .map(|(&t, &f0)| {
            // Unvoiced frames have no true period; a fixed pseudo-period
            // keeps the window sizing defined. The lower clamp keeps the
            // three-period window (2 * round(1.5 * fs / f0) + 1 samples)
            // inside the transform.
            let pseudo = if f0 > 0.0 { f0 } else { DEFAULT_F0 };
            let f0c = pseudo.clamp(3.0 * fs / (fft_size - 2) as f64, fs / 6.0);
            envelope_frame(x, fs, t, f0c, fft_size, &forward, &inverse)
        })
        .collect();

    tracing::debug!(
        frames = rows.len(),
        fft_size,
        "spectral envelope estimation finished"
    );

    let (spectrogram, ps_spectrogram) = rows.into_iter().unzip();
    Ok(EnvelopeEstimate {
        fft_size,
        spectrogram,
        ps_spectrogram,
    })
}

fn envelope_frame(
    x: &[f64],
    fs: f64,
    t: f64,
    f0: f64,
    n: usize,
    forward: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    inverse: &std::sync::Arc<dyn rustfft::Fft<f64>>,
) -> (Vec<f64>, Vec<Complex<f64>>) {
    let half_len = ((1.5 * fs / f0).round() as usize).max(2);
    let seg = windowed_segment(x, fs, t, half_len);
    let spectrum = complex_spectrum(forward, &seg, n);
    let ps_row = spectrum[..=n / 2].to_vec();

    let power: Vec<f64> = spectrum
        .iter()
        .take(n / 2 + 1)
        .map(|c| c.norm_sqr() + SAFE_GUARD_MINIMUM)
        .collect();

    // Frequency smoothing wide enough to bridge adjacent harmonics without
    // flattening formants: 2/3 of the pitch spacing.
    let bin_hz = fs / n as f64;
    let half_width = ((f0 * (2.0 / 3.0) / bin_hz * 0.5).round() as usize).max(1);
    let smoothed = moving_average_mirrored(&power, half_width);

    // Cepstral liftering removes the ripple the smoothing leaves at the
    // pitch quefrency: the sinc lifter has its first zero exactly there.
    let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n];
    for k in 0..=n / 2 {
        buffer[k].re = smoothed[k].ln();
        if k != 0 && k != n / 2 {
            buffer[n - k].re = buffer[k].re;
        }
    }
    inverse.process(&mut buffer);
    let scale = 1.0 / n as f64;
    for c in buffer.iter_mut() {
        *c = Complex::new(c.re * scale, 0.0);
    }
    for m in 1..=n / 2 {
        let q = std::f64::consts::PI * m as f64 * f0 / fs;
        let lifter = if q < 1e-12 { 1.0 } else { q.sin() / q };
        buffer[m].re *= lifter;
        if m != n / 2 {
            buffer[n - m].re *= lifter;
        }
    }
    forward.process(&mut buffer);

    let envelope = buffer
        .iter()
        .take(n / 2 + 1)
        .map(|c| c.re.exp().max(ENVELOPE_FLOOR))
        .collect();
    (envelope, ps_row)
}

/// Rectangular moving average over `2 * half_width + 1` bins, mirroring at
/// DC and Nyquist.
fn moving_average_mirrored(p: &[f64], half_width: usize) -> Vec<f64> {
    let len = p.len();
    let mirror = |j: isize| -> usize {
        let last = (len - 1) as isize;
        let mut idx = j;
        if idx < 0 {
            idx = -idx;
        }
        if idx > last {
            idx = 2 * last - idx;
        }
        idx.clamp(0, last) as usize
    };
    let norm = 1.0 / (2 * half_width + 1) as f64;
    (0..len)
        .map(|k| {
            let mut sum = 0.0;
            for j in (k as isize - half_width as isize)..=(k as isize + half_width as isize) {
                sum += p[mirror(j)];
            }
            sum * norm
        })
        .collect()
}
