//! The parameter bundle shared by every vocoder stage.
//!
//! The bundle replaces loosely-keyed parameter dictionaries with one
//! strongly-typed value whose shape invariants are checked at construction:
//!
//! - every per-frame sequence has the same length as the time axis,
//! - `f0[i] == 0.0` exactly when `vuv[i] == false`,
//! - spectrogram rows are strictly positive, aperiodicity rows lie in [0, 1],
//! - both spectrograms share the bin count `fft_size / 2 + 1`.
//!
//! Fields are private; editing goes through [`crate::editor`], which
//! re-validates before returning.

use crate::{Error, Result};
use rustfft::num_complex::Complex;

/// Time-aligned F0 contour with voicing decisions.
///
/// Produced by the F0 estimators and consumed by the envelope and
/// aperiodicity estimators. `f0[i] == 0.0` means frame `i` is unvoiced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct F0Contour {
    pub temporal_positions: Vec<f64>,
    pub f0: Vec<f64>,
    pub vuv: Vec<bool>,
}

impl F0Contour {
    pub fn frames(&self) -> usize {
        self.temporal_positions.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.f0.len() != self.temporal_positions.len()
            || self.vuv.len() != self.temporal_positions.len()
        {
            return Err(Error::ShapeMismatch(format!(
                "contour lengths differ: {} positions, {} f0, {} vuv",
                self.temporal_positions.len(),
                self.f0.len(),
                self.vuv.len()
            )));
        }
        for (i, (&f, &v)) in self.f0.iter().zip(&self.vuv).enumerate() {
            if (f == 0.0) == v {
                return Err(Error::ShapeMismatch(format!(
                    "frame {}: f0 = {} inconsistent with vuv = {}",
                    i, f, v
                )));
            }
            if f < 0.0 {
                return Err(Error::ShapeMismatch(format!(
                    "frame {}: negative f0 {}",
                    i, f
                )));
            }
        }
        Ok(())
    }
}

/// Complete parametric representation of one analyzed utterance.
#[derive(Debug, Clone)]
pub struct ParameterBundle {
    sample_rate: u32,
    frame_period: f64,
    fft_size: usize,
    temporal_positions: Vec<f64>,
    f0: Vec<f64>,
    vuv: Vec<bool>,
    spectrogram: Vec<Vec<f64>>,
    aperiodicity: Vec<Vec<f64>>,
    /// Pitch-synchronous complex spectrogram, retained for inspection only.
    ps_spectrogram: Option<Vec<Vec<Complex<f64>>>>,
}

impl ParameterBundle {
    /// Assemble a bundle, validating every invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sample_rate: u32,
        frame_period: f64,
        fft_size: usize,
        temporal_positions: Vec<f64>,
        f0: Vec<f64>,
        vuv: Vec<bool>,
        spectrogram: Vec<Vec<f64>>,
        aperiodicity: Vec<Vec<f64>>,
        ps_spectrogram: Option<Vec<Vec<Complex<f64>>>>,
    ) -> Result<Self> {
        let bundle = Self {
            sample_rate,
            frame_period,
            fft_size,
            temporal_positions,
            f0,
            vuv,
            spectrogram,
            aperiodicity,
            ps_spectrogram,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidParameter(
                "sample_rate must be positive".to_string(),
            ));
        }
        if !(self.frame_period > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "frame_period {} must be positive",
                self.frame_period
            )));
        }
        if self.fft_size == 0 || !self.fft_size.is_power_of_two() {
            return Err(Error::InvalidParameter(format!(
                "fft_size {} must be a positive power of two",
                self.fft_size
            )));
        }

        let frames = self.temporal_positions.len();
        if self.f0.len() != frames
            || self.vuv.len() != frames
            || self.spectrogram.len() != frames
            || self.aperiodicity.len() != frames
        {
            return Err(Error::ShapeMismatch(format!(
                "per-frame lengths differ: {} positions, {} f0, {} vuv, {} spectrogram, {} aperiodicity",
                frames,
                self.f0.len(),
                self.vuv.len(),
                self.spectrogram.len(),
                self.aperiodicity.len()
            )));
        }
        if let Some(ps) = &self.ps_spectrogram {
            if ps.len() != frames {
                return Err(Error::ShapeMismatch(format!(
                    "ps spectrogram has {} frames, expected {}",
                    ps.len(),
                    frames
                )));
            }
        }

        for w in self.temporal_positions.windows(2) {
            if w[1] < w[0] {
                return Err(Error::ShapeMismatch(format!(
                    "temporal positions not non-decreasing: {} then {}",
                    w[0], w[1]
                )));
            }
        }

        let bins = self.bins();
        for (i, (&f, &v)) in self.f0.iter().zip(&self.vuv).enumerate() {
            if f < 0.0 || (f == 0.0) == v {
                return Err(Error::ShapeMismatch(format!(
                    "frame {}: f0 = {} inconsistent with vuv = {}",
                    i, f, v
                )));
            }
        }
        for (i, row) in self.spectrogram.iter().enumerate() {
            if row.len() != bins {
                return Err(Error::ShapeMismatch(format!(
                    "spectrogram frame {} has {} bins, expected {}",
                    i,
                    row.len(),
                    bins
                )));
            }
            if row.iter().any(|&p| !(p > 0.0)) {
                return Err(Error::ShapeMismatch(format!(
                    "spectrogram frame {} contains non-positive power",
                    i
                )));
            }
        }
        for (i, row) in self.aperiodicity.iter().enumerate() {
            if row.len() != bins {
                return Err(Error::ShapeMismatch(format!(
                    "aperiodicity frame {} has {} bins, expected {}",
                    i,
                    row.len(),
                    bins
                )));
            }
            if row.iter().any(|&a| !(0.0..=1.0).contains(&a)) {
                return Err(Error::ShapeMismatch(format!(
                    "aperiodicity frame {} leaves [0, 1]",
                    i
                )));
            }
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_period(&self) -> f64 {
        self.frame_period
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency bins per spectrogram row (`fft_size / 2 + 1`).
    pub fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn frames(&self) -> usize {
        self.temporal_positions.len()
    }

    pub fn temporal_positions(&self) -> &[f64] {
        &self.temporal_positions
    }

    pub fn f0(&self) -> &[f64] {
        &self.f0
    }

    pub fn vuv(&self) -> &[bool] {
        &self.vuv
    }

    pub fn spectrogram(&self) -> &[Vec<f64>] {
        &self.spectrogram
    }

    pub fn aperiodicity(&self) -> &[Vec<f64>] {
        &self.aperiodicity
    }

    pub fn ps_spectrogram(&self) -> Option<&[Vec<Complex<f64>>]> {
        self.ps_spectrogram.as_deref()
    }
}
