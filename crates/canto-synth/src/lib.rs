//! # Canto Synth
//!
//! Pitch-synchronous overlap-add resynthesis of a
//! [`canto_core::ParameterBundle`].
//!
//! Pulse times are walked from t = 0: at each pulse the local pitch period
//! comes from the (possibly edited) F0 contour, the envelope and
//! aperiodicity rows are interpolated at the pulse time, and a periodic
//! and/or noise response is rendered through a minimum-phase filter and
//! overlap-added at the pulse sample. Because pulse placement tracks the
//! edited `temporal_positions` and `f0`, duration and pitch edits fall out of
//! the walk itself.
//!
//! Synthesis is deterministic: the noise excitation is seeded per call.

pub mod minimum_phase;

mod excitation;

pub use minimum_phase::MinimumPhase;

use canto_core::dsp::hann_window;
use canto_core::{Error, ParameterBundle, Result, DEFAULT_F0};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed for the aperiodic excitation.
const NOISE_SEED: u64 = 0x43414e544f; // "CANTO"

/// Reconstruct a waveform from a parameter bundle.
///
/// Output length is the final temporal position (in samples) plus the tail
/// of the last frame response (`fft_size` samples).
pub fn synthesize(bundle: &ParameterBundle) -> Result<Vec<f64>> {
    bundle.validate()?;
    if bundle.frames() == 0 {
        return Err(Error::ShapeMismatch(
            "cannot synthesize an empty bundle (zero frames)".to_string(),
        ));
    }

    let fs = bundle.sample_rate() as f64;
    let n = bundle.fft_size();
    let mp = MinimumPhase::new(n);
    let mut rng = StdRng::seed_from_u64(NOISE_SEED);

    let positions = bundle.temporal_positions();
    let last_t = *positions.last().expect("frames > 0");
    let out_len = (last_t * fs).round() as usize + n;
    let mut out = vec![0.0_f64; out_len];

    // Fade the final quarter of each frame response so the overlap-add never
    // drops a truncated tail into the buffer.
    let fade = frame_fade(n);

    let mut t = 0.0;
    let mut pulses = 0usize;
    while t <= last_t {
        let (i0, i1, w) = locate(positions, t);
        let nearest = if w < 0.5 { i0 } else { i1 };
        let voiced = bundle.vuv()[nearest];

        let local_f0 = if voiced {
            voiced_f0_at(bundle.f0(), i0, i1, w)
        } else {
            DEFAULT_F0
        };
        let local_f0 = local_f0.clamp(3.0 * fs / n as f64, fs / 6.0);
        let period_seconds = 1.0 / local_f0;
        let period_samples = period_seconds * fs;

        let envelope = lerp_rows(&bundle.spectrogram()[i0], &bundle.spectrogram()[i1], w);
        let aperiodicity = lerp_rows(&bundle.aperiodicity()[i0], &bundle.aperiodicity()[i1], w);

        let base = (t * fs).round() as usize;
        if voiced {
            let response =
                excitation::periodic_response(&mp, &envelope, &aperiodicity, period_samples);
            overlap_add(&mut out, base, &response, &fade);
        }
        let noise =
            excitation::aperiodic_response(&mp, &envelope, &aperiodicity, period_samples, &mut rng);
        overlap_add(&mut out, base, &noise, &fade);

        pulses += 1;
        t += period_seconds;
    }

    tracing::debug!(pulses, out_len, "synthesis finished");
    Ok(out)
}

/// Locate `t` on the frame time axis: bracketing indices plus the fractional
/// position between them.
fn locate(positions: &[f64], t: f64) -> (usize, usize, f64) {
    if t <= positions[0] {
        return (0, 0, 0.0);
    }
    let last = positions.len() - 1;
    if t >= positions[last] {
        return (last, last, 0.0);
    }
    let i = positions.partition_point(|&p| p <= t);
    let (i0, i1) = (i - 1, i);
    let span = positions[i1] - positions[i0];
    let w = if span > 0.0 { (t - positions[i0]) / span } else { 0.0 };
    (i0, i1, w)
}

/// F0 between two frames, ignoring an unvoiced side of the bracket.
fn voiced_f0_at(f0: &[f64], i0: usize, i1: usize, w: f64) -> f64 {
    match (f0[i0] > 0.0, f0[i1] > 0.0) {
        (true, true) => f0[i0] + (f0[i1] - f0[i0]) * w,
        (true, false) => f0[i0],
        (false, true) => f0[i1],
        (false, false) => DEFAULT_F0,
    }
}

fn lerp_rows(a: &[f64], b: &[f64], w: f64) -> Vec<f64> {
    if w == 0.0 || std::ptr::eq(a, b) {
        return a.to_vec();
    }
    a.iter().zip(b).map(|(&x, &y)| x + (y - x) * w).collect()
}

/// Unity gain with a half-Hann fade over the final quarter.
fn frame_fade(n: usize) -> Vec<f64> {
    let tail = n / 4;
    let ramp = hann_window(2 * tail + 1);
    (0..n)
        .map(|j| {
            if j < n - tail {
                1.0
            } else {
                ramp[tail + (j - (n - tail))]
            }
        })
        .collect()
}

fn overlap_add(out: &mut [f64], base: usize, frame: &[f64], fade: &[f64]) {
    for (j, (&v, &g)) in frame.iter().zip(fade).enumerate() {
        let idx = base + j;
        if idx >= out.len() {
            break;
        }
        out[idx] += v * g;
    }
}
