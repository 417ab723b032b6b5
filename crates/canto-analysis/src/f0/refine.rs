//! Spectral F0 refinement.
//!
//! Sharpens a coarse F0 contour frame by frame: a window of about three
//! periods around the frame time is transformed, the harmonic peaks near
//! `k * f0` are located with parabolic interpolation, and the refined value
//! is the magnitude-weighted mean of `peak_k / k`. Two passes, the second
//! centered on the output of the first.
//!
//! The fast estimator is deliberately noisy and always runs through this
//! pass; the robust estimator reuses [`refine_frame`] internally.

use crate::spectrum::{complex_spectrum, windowed_segment};
use canto_core::dsp::next_pow2;
use canto_core::{AnalysisConfig, Error, Result};
use rustfft::FftPlanner;

/// Harmonics considered per frame (fewer near Nyquist).
const MAX_HARMONICS: usize = 6;

/// Refine every voiced frame of a coarse contour. Unvoiced frames (f0 = 0)
/// pass through; frames whose refinement collapses become unvoiced.
pub fn refine(
    x: &[f64],
    sample_rate: u32,
    temporal_positions: &[f64],
    f0: &[f64],
    config: &AnalysisConfig,
) -> Result<Vec<f64>> {
    if temporal_positions.len() != f0.len() {
        return Err(Error::ShapeMismatch(format!(
            "refine: {} positions vs {} f0 values",
            temporal_positions.len(),
            f0.len()
        )));
    }
    let fs = sample_rate as f64;
    let refined = temporal_positions
        .iter()
        .zip(f0)
        .map(|(&t, &coarse)| {
            if coarse <= 0.0 {
                return 0.0;
            }
            let first = refine_frame(x, fs, t, coarse, config).unwrap_or(0.0);
            if first <= 0.0 {
                return 0.0;
            }
            refine_frame(x, fs, t, first, config).unwrap_or(first)
        })
        .collect();
    Ok(refined)
}

/// One refinement pass on a single frame. Returns `None` when no usable
/// harmonic structure is found near `f0_initial`.
pub(crate) fn refine_frame(
    x: &[f64],
    sample_rate: f64,
    center_time: f64,
    f0_initial: f64,
    config: &AnalysisConfig,
) -> Option<f64> {
    let f0c = f0_initial.clamp(config.f0_floor * 0.5, config.f0_ceil * 2.0);
    let half_len = ((1.5 * sample_rate / f0c).round() as usize).max(2);
    let seg = windowed_segment(x, sample_rate, center_time, half_len);

    // Extra zero padding buys interpolation accuracy on the peak positions.
    let nfft = next_pow2((2 * half_len + 1) * 2);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);
    let spectrum = complex_spectrum(&fft, &seg, nfft);
    let magnitude: Vec<f64> = spectrum[..=nfft / 2].iter().map(|c| c.norm()).collect();

    let bin_hz = sample_rate / nfft as f64;
    let harmonics = MAX_HARMONICS.min((0.45 * sample_rate / f0c) as usize).max(1);
    let search = ((0.35 * f0c / bin_hz).round() as usize).max(1);

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for k in 1..=harmonics {
        let center_bin = (k as f64 * f0c / bin_hz).round() as usize;
        if center_bin + search + 1 >= magnitude.len() || center_bin <= search {
            break;
        }
        let lo = center_bin - search;
        let hi = center_bin + search;
        let (peak_bin, _) = (lo..=hi)
            .map(|b| (b, magnitude[b]))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())?;
        if peak_bin == 0 || peak_bin + 1 >= magnitude.len() {
            continue;
        }
        let m0 = magnitude[peak_bin - 1];
        let m1 = magnitude[peak_bin];
        let m2 = magnitude[peak_bin + 1];
        if m1 <= 0.0 {
            continue;
        }
        let denom = m0 - 2.0 * m1 + m2;
        let delta = if denom.abs() > 1e-12 {
            (0.5 * (m0 - m2) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };
        let peak_freq = (peak_bin as f64 + delta) * bin_hz;
        weighted += m1 * peak_freq / k as f64;
        weight_sum += m1;
    }

    if weight_sum <= 1e-12 {
        return None;
    }
    let refined = weighted / weight_sum;
    if refined < config.f0_floor * 0.5 || refined > config.f0_ceil * 2.0 {
        return None;
    }
    // A wild jump means the harmonic fit latched onto something else; the
    // coarse value is more trustworthy than the fit in that case.
    if (refined - f0c).abs() / f0c > 0.3 {
        tracing::trace!(coarse = f0c, refined, "refinement rejected, keeping coarse value");
        return Some(f0c);
    }
    Some(refined)
}
