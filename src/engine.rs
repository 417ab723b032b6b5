//! Analysis/synthesis engine wiring the pipeline stages together.

use rustfft::num_complex::Complex;

use crate::builder::CantoEngineBuilder;
use crate::{AnalysisConfig, F0Contour, F0Method, ParameterBundle, Result};

/// Spectral envelope estimate on its own, before a full bundle is assembled.
#[derive(Debug, Clone)]
pub struct SpectrumEstimate {
    /// Frame centers in seconds, copied from the contour that drove the
    /// estimation.
    pub temporal_positions: Vec<f64>,
    /// FFT size of both spectrograms.
    pub fft_size: usize,
    /// Smoothed power envelope, frames x (fft_size / 2 + 1).
    pub spectrogram: Vec<Vec<f64>>,
    /// Complex pitch-synchronous spectrogram on the same axes.
    pub ps_spectrogram: Vec<Vec<Complex<f64>>>,
}

/// The vocoder engine: holds a validated configuration and runs the
/// analysis and synthesis pipelines over raw sample buffers.
///
/// Constructed through [`CantoEngine::builder`]. The engine itself is
/// stateless between calls; the same instance can analyze any number of
/// utterances at different sample rates.
pub struct CantoEngine {
    config: AnalysisConfig,
    method: F0Method,
}

impl CantoEngine {
    pub(crate) fn new(config: AnalysisConfig, method: F0Method) -> Self {
        Self { config, method }
    }

    pub fn builder() -> CantoEngineBuilder {
        CantoEngineBuilder::new()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn f0_method(&self) -> F0Method {
        self.method
    }

    /// Estimate the F0 contour of `x` with the configured method.
    pub fn estimate_f0(&self, x: &[f64], sample_rate: u32) -> Result<F0Contour> {
        canto_analysis::estimate_f0(x, sample_rate, self.method, &self.config)
    }

    /// Estimate the spectral envelope of `x`, running F0 estimation
    /// internally to drive the pitch-adaptive windows.
    pub fn estimate_spectrum(&self, x: &[f64], sample_rate: u32) -> Result<SpectrumEstimate> {
        let contour = self.estimate_f0(x, sample_rate)?;
        let est = canto_analysis::envelope::estimate(x, sample_rate, &contour, &self.config)?;
        Ok(SpectrumEstimate {
            temporal_positions: contour.temporal_positions,
            fft_size: est.fft_size,
            spectrogram: est.spectrogram,
            ps_spectrogram: est.ps_spectrogram,
        })
    }

    /// Full analysis: F0, spectral envelope, and aperiodicity, assembled
    /// into a validated [`ParameterBundle`].
    pub fn analyze(&self, x: &[f64], sample_rate: u32) -> Result<ParameterBundle> {
        let contour = self.estimate_f0(x, sample_rate)?;
        let envelope = canto_analysis::envelope::estimate(x, sample_rate, &contour, &self.config)?;
        let aperiodicity = canto_analysis::aperiodicity::estimate(
            x,
            sample_rate,
            &contour,
            envelope.fft_size,
            &self.config,
        )?;

        ParameterBundle::new(
            sample_rate,
            self.config.frame_period,
            envelope.fft_size,
            contour.temporal_positions,
            contour.f0,
            contour.vuv,
            envelope.spectrogram,
            aperiodicity,
            Some(envelope.ps_spectrogram),
        )
    }

    /// Reconstruct a waveform from a bundle, edited or fresh from
    /// [`analyze`](Self::analyze).
    pub fn synthesize(&self, bundle: &ParameterBundle) -> Result<Vec<f64>> {
        canto_synth::synthesize(bundle)
    }
}
