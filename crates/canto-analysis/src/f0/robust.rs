//! Robust (single-pass) F0 estimation.
//!
//! Per frame, a log-spaced candidate grid between `f0_floor` and `f0_ceil`
//! is scored against power spectra taken at two window lengths. A candidate
//! scores well when the energy at its harmonics dominates the energy halfway
//! between them, weighted so that a missing fundamental disqualifies
//! subharmonic candidates. The candidate with the best worst-case score
//! across both windows wins and is sharpened with the same harmonic-peak fit
//! the refinement pass uses, so no separate refinement is needed.
//!
//! Frames are mutually independent and processed in parallel; each frame
//! writes only its own slot.

use crate::f0::refine::refine_frame;
use crate::spectrum::{power_at, power_spectrum, windowed_segment};
use canto_core::dsp::{next_pow2, rms};
use canto_core::{AnalysisConfig, Error, F0Contour, Result};
use rayon::prelude::*;
use rustfft::FftPlanner;

/// Candidate spacing: 48 steps per octave.
const GRID_STEP: f64 = 1.0 / 48.0;

/// Harmonic-dominance score below which a frame is unvoiced.
const VOICING_THRESHOLD: f64 = 0.3;

/// Frames quieter than this RMS are silent.
const SILENCE_GATE: f64 = 1e-7;

/// Median smoothing width, in frames.
const MEDIAN_WIDTH: usize = 5;

/// Estimate an F0 contour in a single pass.
pub fn estimate(x: &[f64], sample_rate: u32, config: &AnalysisConfig) -> Result<F0Contour> {
    config.validate()?;
    if sample_rate == 0 {
        return Err(Error::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    let fs = sample_rate as f64;
    let min_len = (2.0 * fs / config.f0_floor).ceil() as usize;
    if x.len() < min_len {
        return Err(Error::InsufficientData {
            needed: min_len,
            got: x.len(),
        });
    }

    let frames = (x.len() as f64 / fs / config.frame_period).floor() as usize + 1;
    let temporal_positions: Vec<f64> = (0..frames)
        .map(|i| i as f64 * config.frame_period)
        .collect();

    // Two analysis windows: the long one resolves low pitch, the short one
    // keeps the estimate local. A candidate must score on both.
    let half_short = (0.020 * fs).round() as usize;
    let half_long = (0.040 * fs).round() as usize;
    let nfft_short = next_pow2(2 * half_short + 1) * 2;
    let nfft_long = next_pow2(2 * half_long + 1) * 2;

    let mut planner = FftPlanner::new();
    let fft_short = planner.plan_fft_forward(nfft_short);
    let fft_long = planner.plan_fft_forward(nfft_long);

    let candidates: Vec<f64> = {
        let steps = ((config.f0_ceil / config.f0_floor).log2() / GRID_STEP).ceil() as usize;
        (0..=steps)
            .map(|i| config.f0_floor * 2.0_f64.powf(i as f64 * GRID_STEP))
            .filter(|&f| f <= config.f0_ceil)
            .collect()
    };

    let f0: Vec<f64> = temporal_positions
        .par_iter()
        .map(|&t| {
            let seg_short = windowed_segment(x, fs, t, half_short);
            if rms(&seg_short) < SILENCE_GATE {
                return 0.0;
            }
            let seg_long = windowed_segment(x, fs, t, half_long);
            let p_short = power_spectrum(&fft_short, &seg_short, nfft_short);
            let p_long = power_spectrum(&fft_long, &seg_long, nfft_long);

            let mut best = (0.0_f64, f64::NEG_INFINITY);
            for &fc in &candidates {
                let s = harmonic_score(&p_short, fc, fs)
                    .min(harmonic_score(&p_long, fc, fs));
                if s > best.1 {
                    best = (fc, s);
                }
            }
            if best.1 < VOICING_THRESHOLD {
                return 0.0;
            }
            refine_frame(x, fs, t, best.0, config).unwrap_or(best.0)
        })
        .collect();

    let f0 = median_smooth(&f0, MEDIAN_WIDTH);
    let vuv: Vec<bool> = f0.iter().map(|&f| f != 0.0).collect();
    tracing::debug!(
        frames,
        voiced = vuv.iter().filter(|&&v| v).count(),
        candidates = candidates.len(),
        "robust F0 estimation finished"
    );

    Ok(F0Contour {
        temporal_positions,
        f0,
        vuv,
    })
}

/// Harmonic dominance of candidate `fc` in a power spectrum, in [-1, 1]-ish:
/// the normalized margin between harmonic and inter-harmonic energy, scaled
/// by the relative strength of the fundamental so that subharmonics of a
/// periodic signal do not tie with the true pitch.
fn harmonic_score(p: &[f64], fc: f64, sample_rate: f64) -> f64 {
    let harmonics = ((0.45 * sample_rate / fc) as usize).clamp(1, 8);
    let mut harmonic = 0.0;
    let mut inter = 0.0;
    let mut strongest = 0.0_f64;
    for k in 1..=harmonics {
        let kf = k as f64 * fc;
        let h = power_at(p, kf, sample_rate);
        harmonic += h;
        strongest = strongest.max(h);
        inter += 0.5 * (power_at(p, kf - 0.5 * fc, sample_rate)
            + power_at(p, kf + 0.5 * fc, sample_rate));
    }
    let total = harmonic + inter;
    if total <= 1e-12 {
        return 0.0;
    }
    let margin = (harmonic - inter) / total;
    let fundamental = power_at(p, fc, sample_rate);
    margin * (fundamental / (strongest + 1e-300)).sqrt()
}

/// Replace each voiced value with the median of the voiced values in its
/// neighborhood. Unvoiced frames stay unvoiced.
fn median_smooth(f0: &[f64], width: usize) -> Vec<f64> {
    if f0.len() < 3 || width < 2 {
        return f0.to_vec();
    }
    let half = width / 2;
    f0.iter()
        .enumerate()
        .map(|(i, &f)| {
            if f == 0.0 {
                return 0.0;
            }
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(f0.len());
            let mut voiced: Vec<f64> = f0[start..end].iter().copied().filter(|&v| v > 0.0).collect();
            voiced.sort_by(|a, b| a.partial_cmp(b).unwrap());
            voiced[voiced.len() / 2]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_train(f0: f64, sample_rate: f64, duration: f64) -> Vec<f64> {
        let harmonics = (0.45 * sample_rate / f0).floor() as usize;
        let n = (sample_rate * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (1..=harmonics)
                    .map(|k| (2.0 * std::f64::consts::PI * k as f64 * f0 * t).cos())
                    .sum::<f64>()
                    / harmonics as f64
            })
            .collect()
    }

    #[test]
    fn test_robust_estimate_pulse_train() {
        let config = AnalysisConfig::default();
        let x = pulse_train(150.0, 16000.0, 1.0);
        let contour = estimate(&x, 16000, &config).unwrap();

        for i in 10..contour.frames() - 10 {
            assert!(contour.vuv[i], "frame {} should be voiced", i);
            assert!(
                (contour.f0[i] - 150.0).abs() < 3.0,
                "frame {}: expected ~150 Hz, got {}",
                i,
                contour.f0[i]
            );
        }
    }

    #[test]
    fn test_robust_sine() {
        let config = AnalysisConfig::default();
        let fs = 16000.0;
        let x: Vec<f64> = (0..16000)
            .map(|i| (2.0 * std::f64::consts::PI * 220.0 * i as f64 / fs).sin())
            .collect();
        let contour = estimate(&x, 16000, &config).unwrap();
        for i in 10..contour.frames() - 10 {
            assert!(contour.vuv[i], "frame {} should be voiced", i);
            assert!(
                (contour.f0[i] - 220.0).abs() < 3.0,
                "frame {}: expected ~220 Hz, got {}",
                i,
                contour.f0[i]
            );
        }
    }

    #[test]
    fn test_robust_silence() {
        let config = AnalysisConfig::default();
        let contour = estimate(&vec![0.0; 8000], 16000, &config).unwrap();
        assert!(contour.f0.iter().all(|&f| f == 0.0));
        assert!(contour.vuv.iter().all(|&v| !v));
    }

    #[test]
    fn test_median_smooth_removes_outlier() {
        let f0 = vec![150.0, 150.0, 300.0, 150.0, 150.0];
        let smoothed = median_smooth(&f0, 5);
        assert_eq!(smoothed[2], 150.0);
    }

    #[test]
    fn test_median_smooth_keeps_unvoiced() {
        let f0 = vec![150.0, 0.0, 150.0];
        let smoothed = median_smooth(&f0, 5);
        assert_eq!(smoothed[1], 0.0);
    }
}
