//! Aperiodicity estimation.
//!
//! Quantifies the noise-versus-periodic energy split per frequency band per
//! frame. For a voiced frame the power spectrum of a four-period window is
//! sampled at the harmonics of the local F0 (expected periodic) and halfway
//! between them (expected purely aperiodic); harmonics are grouped into
//! coarse ~3 kHz bands and each band's inter-harmonic-to-total ratio becomes
//! its aperiodicity. The coarse values are interpolated onto the full
//! spectrogram axis and clamped to `[APERIODICITY_FLOOR, 1.0]`.
//!
//! Unvoiced frames are maximally aperiodic (1.0 across all bins) by
//! convention.

use crate::spectrum::{power_at, power_spectrum, windowed_segment};
use canto_core::dsp::{interp_contour, next_pow2};
use canto_core::{AnalysisConfig, Error, F0Contour, Result, APERIODICITY_FLOOR, SAFE_GUARD_MINIMUM};
use rayon::prelude::*;
use rustfft::FftPlanner;

/// Width of the coarse bands, in Hz.
const BAND_WIDTH: f64 = 3000.0;

/// Estimate the aperiodicity spectrogram along an F0 contour.
///
/// `fft_size` is the bundle's spectrogram FFT size; rows come back with
/// `fft_size / 2 + 1` bins so they align with the envelope rows.
pub fn estimate(
    x: &[f64],
    sample_rate: u32,
    contour: &F0Contour,
    fft_size: usize,
    config: &AnalysisConfig,
) -> Result<Vec<Vec<f64>>> {
    config.validate()?;
    contour.validate()?;
    if sample_rate == 0 {
        return Err(Error::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    if fft_size == 0 || !fft_size.is_power_of_two() {
        return Err(Error::InvalidParameter(format!(
            "fft_size {} must be a positive power of two",
            fft_size
        )));
    }
    if x.is_empty() {
        return Err(Error::InsufficientData { needed: 1, got: 0 });
    }

    let fs = sample_rate as f64;
    let bins = fft_size / 2 + 1;

    // One internal transform size fits the longest four-period window.
    let nfft = next_pow2((4.0 * fs / config.f0_floor).ceil() as usize + 1) * 2;
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);

    let rows: Vec<Vec<f64>> = contour
        .temporal_positions
        .par_iter()
        .zip(&contour.f0)
        .map(|(&t, &f0)| {
            if f0 <= 0.0 {
                return vec![1.0; bins];
            }
            let f0c = f0.clamp(config.f0_floor, fs / 8.0);
            aperiodicity_frame(x, fs, t, f0c, fft_size, nfft, &fft)
        })
        .collect();

    tracing::debug!(frames = rows.len(), "aperiodicity estimation finished");
    Ok(rows)
}

fn aperiodicity_frame(
    x: &[f64],
    fs: f64,
    t: f64,
    f0: f64,
    fft_size: usize,
    nfft: usize,
    fft: &std::sync::Arc<dyn rustfft::Fft<f64>>,
) -> Vec<f64> {
    let half_len = ((2.0 * fs / f0).round() as usize).max(2);
    let seg = windowed_segment(x, fs, t, half_len);
    let p = power_spectrum(fft, &seg, nfft);

    let nyquist = fs / 2.0;
    let max_harmonic = ((0.45 * fs / f0) as usize).max(1);
    let band_count = ((nyquist / BAND_WIDTH).ceil() as usize).max(1);

    // Coarse band centers and their inter-harmonic energy ratios.
    let mut centers = Vec::with_capacity(band_count + 1);
    let mut ratios = Vec::with_capacity(band_count + 1);
    let mut previous = 1.0;
    for band in 0..band_count {
        let lo = band as f64 * BAND_WIDTH;
        let hi = (lo + BAND_WIDTH).min(nyquist);
        let mut harmonic = 0.0;
        let mut inter = 0.0;
        let mut counted = 0usize;
        for k in 1..=max_harmonic {
            let kf = k as f64 * f0;
            if kf < lo || kf >= hi {
                continue;
            }
            harmonic += power_at(&p, kf, fs);
            inter += 0.5
                * (power_at(&p, kf - 0.5 * f0, fs) + power_at(&p, kf + 0.5 * f0, fs));
            counted += 1;
        }
        let ratio = if counted == 0 || harmonic + inter <= SAFE_GUARD_MINIMUM {
            // No harmonic support in this band: carry the neighbor's value
            // (fully aperiodic when there is no lower band).
            previous
        } else {
            (inter / (harmonic + inter)).clamp(APERIODICITY_FLOOR, 1.0)
        };
        centers.push((lo + hi) * 0.5);
        ratios.push(ratio);
        previous = ratio;
    }
    if *centers.last().unwrap() < nyquist {
        centers.push(nyquist);
        ratios.push(previous);
    }

    let bin_hz = fs / fft_size as f64;
    (0..fft_size / 2 + 1)
        .map(|k| {
            interp_contour(&centers, &ratios, k as f64 * bin_hz)
                .clamp(APERIODICITY_FLOOR, 1.0)
        })
        .collect()
}
