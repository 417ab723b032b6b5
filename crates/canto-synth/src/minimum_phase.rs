//! Minimum-phase spectra via the cepstral method.
//!
//! The synthesizer filters every excitation through a minimum-phase system
//! derived from a power envelope: log spectrum -> cepstrum -> fold onto the
//! causal side -> transform back -> complex exponential. Minimum phase keeps
//! the energy of each frame response packed at its onset, which is what the
//! pulse-synchronous overlap-add relies on.

use canto_core::SAFE_GUARD_MINIMUM;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

pub struct MinimumPhase {
    fft_size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl MinimumPhase {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size,
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Minimum-phase complex spectrum (full length) for a half power
    /// spectrum of `fft_size / 2 + 1` bins.
    pub fn spectrum(&self, power: &[f64]) -> Vec<Complex<f64>> {
        let n = self.fft_size;
        debug_assert_eq!(power.len(), n / 2 + 1);

        // Log amplitude, symmetric.
        let mut buffer = vec![Complex::new(0.0, 0.0); n];
        for k in 0..=n / 2 {
            buffer[k].re = 0.5 * power[k].max(SAFE_GUARD_MINIMUM).ln();
            if k != 0 && k != n / 2 {
                buffer[n - k].re = buffer[k].re;
            }
        }
        self.inverse.process(&mut buffer);
        let scale = 1.0 / n as f64;

        // Fold the even cepstrum onto the causal side.
        let mut cepstrum = vec![Complex::new(0.0, 0.0); n];
        cepstrum[0] = Complex::new(buffer[0].re * scale, 0.0);
        for m in 1..n / 2 {
            cepstrum[m] = Complex::new(2.0 * buffer[m].re * scale, 0.0);
        }
        cepstrum[n / 2] = Complex::new(buffer[n / 2].re * scale, 0.0);

        self.forward.process(&mut cepstrum);
        cepstrum.iter().map(|c| c.exp()).collect()
    }

    /// Minimum-phase impulse response (length `fft_size`).
    pub fn impulse_response(&self, power: &[f64]) -> Vec<f64> {
        let mut spectrum = self.spectrum(power);
        self.inverse.process(&mut spectrum);
        let scale = 1.0 / self.fft_size as f64;
        spectrum.iter().map(|c| c.re * scale).collect()
    }

    pub(crate) fn forward_in_place(&self, buffer: &mut [Complex<f64>]) {
        self.forward.process(buffer);
    }

    pub(crate) fn inverse_in_place(&self, buffer: &mut [Complex<f64>]) {
        self.inverse.process(buffer);
    }
}
