//! Fast (coarse) F0 estimation.
//!
//! Multi-band zero-crossing estimator: the signal is low-pass filtered into
//! half-octave candidate channels between `f0_floor` and `f0_ceil`; in a
//! channel whose cutoff brackets the true pitch only the fundamental
//! survives, so its interval events line up. Per channel, four event-interval
//! tracks are extracted (rising and falling zero crossings, peaks, dips);
//! their agreement at each frame time scores the channel, and the
//! steadiest channel wins the frame.
//!
//! The output is deliberately cheap and coarse. The pipeline always follows
//! it with the spectral refinement pass in [`super::refine`].

use canto_core::dsp::{interp_contour, next_pow2};
use canto_core::{AnalysisConfig, Error, F0Contour, Result};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Relative interval deviation above which a frame candidate is discarded.
const MAX_DEVIATION: f64 = 0.1;

/// Channels whose filtered output never exceeds this are silent.
const AMPLITUDE_GATE: f64 = 1e-9;

/// Estimate a coarse F0 contour.
///
/// Frame 0 is at t = 0 and frames are spaced `config.frame_period` apart.
/// Unvoiced frames report `f0 = 0`.
pub fn estimate(x: &[f64], sample_rate: u32, config: &AnalysisConfig) -> Result<F0Contour> {
    config.validate()?;
    if sample_rate == 0 {
        return Err(Error::InvalidParameter(
            "sample_rate must be positive".to_string(),
        ));
    }
    let fs = sample_rate as f64;
    // At least two periods of the lowest analyzable pitch.
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

    // One forward transform of the whole signal; each channel reuses it.
    let nfft = next_pow2(x.len());
    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(nfft);
    let inverse = planner.plan_fft_inverse(nfft);
    let mut spectrum = vec![Complex::new(0.0, 0.0); nfft];
    for (b, &s) in spectrum.iter_mut().zip(x) {
        b.re = s;
    }
    forward.process(&mut spectrum);

    let mut best_f0 = vec![0.0_f64; frames];
    let mut best_score = vec![f64::INFINITY; frames];

    let mut cutoff = config.f0_floor;
    while cutoff <= config.f0_ceil * 1.05 {
        let filtered = low_pass(&spectrum, &inverse, nfft, x.len(), cutoff, fs);
        score_channel(
            &filtered,
            fs,
            &temporal_positions,
            config,
            &mut best_f0,
            &mut best_score,
        );
        cutoff *= std::f64::consts::SQRT_2;
    }

    let voiced = best_score.iter().filter(|&&s| s < MAX_DEVIATION).count();
    tracing::debug!(
        frames,
        voiced,
        "coarse F0 estimation finished ({} channels)",
        ((config.f0_ceil / config.f0_floor).log2() * 2.0).ceil() as usize + 1
    );

    let f0: Vec<f64> = best_f0
        .iter()
        .zip(&best_score)
        .map(|(&f, &s)| if s < MAX_DEVIATION { f } else { 0.0 })
        .collect();
    let vuv = f0.iter().map(|&f| f != 0.0).collect();

    Ok(F0Contour {
        temporal_positions,
        f0,
        vuv,
    })
}

/// Low-pass the pre-computed signal spectrum: unity below `cutoff`, raised
/// cosine rolloff to zero at `2 * cutoff`.
fn low_pass(
    spectrum: &[Complex<f64>],
    inverse: &std::sync::Arc<dyn rustfft::Fft<f64>>,
    nfft: usize,
    out_len: usize,
    cutoff: f64,
    sample_rate: f64,
) -> Vec<f64> {
    let mut buffer = spectrum.to_vec();
    let bin_hz = sample_rate / nfft as f64;
    for k in 0..=nfft / 2 {
        let f = k as f64 * bin_hz;
        let gain = if f <= cutoff {
            1.0
        } else if f < 2.0 * cutoff {
            0.5 * (1.0 + (std::f64::consts::PI * (f - cutoff) / cutoff).cos())
        } else {
            0.0
        };
        buffer[k] *= gain;
        if k != 0 && k != nfft / 2 {
            buffer[nfft - k] *= gain;
        }
    }
    inverse.process(&mut buffer);
    let scale = 1.0 / nfft as f64;
    buffer[..out_len].iter().map(|c| c.re * scale).collect()
}

/// Extract the four interval tracks from one filtered channel and fold its
/// per-frame candidates into the running best.
fn score_channel(
    y: &[f64],
    sample_rate: f64,
    temporal_positions: &[f64],
    config: &AnalysisConfig,
    best_f0: &mut [f64],
    best_score: &mut [f64],
) {
    let peak = y.iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
    if peak < AMPLITUDE_GATE {
        return;
    }

    let dy: Vec<f64> = y.windows(2).map(|w| w[1] - w[0]).collect();
    let neg_y: Vec<f64> = y.iter().map(|&v| -v).collect();
    let neg_dy: Vec<f64> = dy.iter().map(|&v| -v).collect();

    let tracks = [
        interval_track(&rising_crossings(y), sample_rate),
        interval_track(&rising_crossings(&neg_y), sample_rate),
        interval_track(&rising_crossings(&neg_dy), sample_rate), // peaks
        interval_track(&rising_crossings(&dy), sample_rate),     // dips
    ];
    if tracks.iter().any(|t| t.is_none()) {
        return;
    }
    let tracks: Vec<&(Vec<f64>, Vec<f64>)> = tracks.iter().map(|t| t.as_ref().unwrap()).collect();

    for (i, &t) in temporal_positions.iter().enumerate() {
        let mut values = [0.0_f64; 4];
        for (v, (times, f0s)) in values.iter_mut().zip(&tracks) {
            *v = interp_contour(times, f0s, t);
        }
        let mean = values.iter().sum::<f64>() / 4.0;
        if mean < config.f0_floor * 0.9 || mean > config.f0_ceil * 1.1 {
            continue;
        }
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 4.0;
        let deviation = variance.sqrt() / mean;
        if deviation < best_score[i] {
            best_score[i] = deviation;
            best_f0[i] = mean;
        }
    }
}

/// Sample positions of negative-to-positive zero crossings, with linear
/// sub-sample interpolation.
fn rising_crossings(y: &[f64]) -> Vec<f64> {
    let mut out = Vec::new();
    for i in 0..y.len().saturating_sub(1) {
        if y[i] < 0.0 && y[i + 1] >= 0.0 {
            let frac = y[i] / (y[i] - y[i + 1]);
            out.push(i as f64 + frac);
        }
    }
    out
}

/// Turn event positions into an instantaneous-F0 track: each interval yields
/// one F0 sample at its midpoint time (seconds).
fn interval_track(crossings: &[f64], sample_rate: f64) -> Option<(Vec<f64>, Vec<f64>)> {
    if crossings.len() < 2 {
        return None;
    }
    let mut times = Vec::with_capacity(crossings.len() - 1);
    let mut f0s = Vec::with_capacity(crossings.len() - 1);
    for w in crossings.windows(2) {
        let interval = w[1] - w[0];
        if interval <= 0.0 {
            continue;
        }
        times.push((w[0] + w[1]) * 0.5 / sample_rate);
        f0s.push(sample_rate / interval);
    }
    if times.len() < 2 {
        return None;
    }
    Some((times, f0s))
}
