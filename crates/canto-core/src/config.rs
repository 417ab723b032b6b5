//! Analysis configuration.

use crate::{Error, Result};
use std::str::FromStr;

/// Pseudo fundamental used wherever a pitch period is needed but the frame is
/// unvoiced (window sizing during analysis, pulse spacing during synthesis).
pub const DEFAULT_F0: f64 = 500.0;

/// Lower clamp for aperiodicity values. Exactly-zero aperiodicity makes the
/// periodic/noise split degenerate downstream.
pub const APERIODICITY_FLOOR: f64 = 0.001;

/// Power floor applied before any log of a spectrum.
pub const SAFE_GUARD_MINIMUM: f64 = 1e-12;

/// F0 estimation algorithm.
///
/// A closed enumeration: unrecognized method names fail at the boundary with
/// [`Error::InvalidMethod`] instead of silently falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum F0Method {
    /// Cheap multi-band zero-crossing estimator followed by a mandatory
    /// spectral refinement pass.
    #[default]
    Fast,
    /// Higher-accuracy single-pass harmonic estimator.
    Robust,
}

impl FromStr for F0Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fast" => Ok(F0Method::Fast),
            "robust" => Ok(F0Method::Robust),
            other => Err(Error::InvalidMethod(other.to_string())),
        }
    }
}

/// Configuration for the analysis stages.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnalysisConfig {
    /// Frame period in seconds (frame 0 is at t = 0).
    pub frame_period: f64,
    /// Lowest F0 the estimators will report, in Hz.
    pub f0_floor: f64,
    /// Highest F0 the estimators will report, in Hz.
    pub f0_ceil: f64,
    /// FFT size for the envelope/aperiodicity spectrograms. `None` derives it
    /// from the sample rate and `f0_floor`.
    pub fft_size: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_period: 0.005,
            f0_floor: 71.0,
            f0_ceil: 800.0,
            fft_size: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_period > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "frame_period {} must be positive",
                self.frame_period
            )));
        }
        if !(self.f0_floor > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "f0_floor {} must be positive",
                self.f0_floor
            )));
        }
        if self.f0_ceil <= self.f0_floor {
            return Err(Error::InvalidParameter(format!(
                "f0_ceil {} must exceed f0_floor {}",
                self.f0_ceil, self.f0_floor
            )));
        }
        if let Some(n) = self.fft_size {
            // 32 is the smallest power of two that can hold a three-period
            // analysis window at any admissible pitch.
            if n < 32 || !n.is_power_of_two() {
                return Err(Error::InvalidParameter(format!(
                    "fft_size {} must be a power of two >= 32",
                    n
                )));
            }
        }
        Ok(())
    }

    /// FFT size used for the spectrogram rows at a given sample rate.
    ///
    /// Defaults to the next power of two that fits three periods of the
    /// lowest analyzable pitch, so the longest adaptive analysis window
    /// always fits the transform.
    pub fn fft_size_for(&self, sample_rate: u32) -> usize {
        match self.fft_size {
            Some(n) => n,
            None => {
                let min_window = 3.0 * sample_rate as f64 / self.f0_floor + 1.0;
                crate::dsp::next_pow2(min_window.ceil() as usize).max(32)
            }
        }
    }
}
