//! # Canto Analysis
//!
//! The analysis half of the canto vocoder. Decomposes a mono `&[f64]` buffer
//! into the parametric representation in [`canto_core::ParameterBundle`]:
//!
//! - **F0 estimation** ([`f0`]): fast (coarse + refinement) or robust
//!   (single-pass) contour estimation with voicing decisions
//! - **Spectral envelope** ([`envelope`]): pitch-adaptive smoothed power
//!   spectrogram with the pitch-synchronous complex spectrogram alongside
//! - **Aperiodicity** ([`aperiodicity`]): per-band noise-to-total energy
//!   ratios on the same frame/frequency axes
//!
//! Every stage needs the whole utterance before it runs; within a stage,
//! frames are independent and computed in parallel.

pub mod aperiodicity;
pub mod envelope;
pub mod f0;

mod spectrum;

pub use envelope::EnvelopeEstimate;

use canto_core::{AnalysisConfig, F0Contour, F0Method, Result};

/// Estimate an F0 contour with the selected method.
///
/// The fast variant is mandatorily refined before it is returned; the robust
/// variant refines internally.
pub fn estimate_f0(
    x: &[f64],
    sample_rate: u32,
    method: F0Method,
    config: &AnalysisConfig,
) -> Result<F0Contour> {
    match method {
        F0Method::Fast => {
            let coarse = f0::fast::estimate(x, sample_rate, config)?;
            let refined = f0::refine::refine(
                x,
                sample_rate,
                &coarse.temporal_positions,
                &coarse.f0,
                config,
            )?;
            let vuv = refined.iter().map(|&f| f != 0.0).collect();
            Ok(F0Contour {
                temporal_positions: coarse.temporal_positions,
                f0: refined,
                vuv,
            })
        }
        F0Method::Robust => f0::robust::estimate(x, sample_rate, config),
    }
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
    fn test_both_methods_agree_on_pulse_train() {
        let config = AnalysisConfig::default();
        let x = pulse_train(150.0, 16000.0, 1.0);

        let fast = estimate_f0(&x, 16000, F0Method::Fast, &config).unwrap();
        let robust = estimate_f0(&x, 16000, F0Method::Robust, &config).unwrap();
        assert_eq!(fast.frames(), robust.frames());

        for i in 10..fast.frames() - 10 {
            assert!((fast.f0[i] - 150.0).abs() < 3.0, "fast frame {}: {}", i, fast.f0[i]);
            assert!(
                (robust.f0[i] - 150.0).abs() < 3.0,
                "robust frame {}: {}",
                i,
                robust.f0[i]
            );
        }
    }
}
