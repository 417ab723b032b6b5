//! Parameter editing.
//!
//! Pure transformations over a [`ParameterBundle`]: each function leaves its
//! input untouched, returns a freshly validated bundle, and composes with the
//! others in any order. Pitch and duration edits only touch the source
//! parameters; the synthesizer reinterprets frame spacing and pulse placement
//! from the edited contour.

use crate::dsp::interp_at;
use crate::{Error, ParameterBundle, Result};

/// Multiply every F0 value by `factor`.
///
/// Unvoiced frames stay at 0 (and stay unvoiced). The time axis and both
/// spectrograms are untouched.
pub fn scale_pitch(bundle: &ParameterBundle, factor: f64) -> Result<ParameterBundle> {
    check_positive_factor("pitch scale", factor)?;
    let f0 = bundle.f0().iter().map(|&f| f * factor).collect();
    rebuild(bundle, None, Some(f0), None)
}

/// Replace the time axis and F0 contour wholesale.
///
/// `times` and `values` must match the bundle's frame count; the voicing
/// decision is derived from `value != 0`.
pub fn set_pitch(bundle: &ParameterBundle, times: &[f64], values: &[f64]) -> Result<ParameterBundle> {
    if times.len() != bundle.frames() || values.len() != bundle.frames() {
        return Err(Error::ShapeMismatch(format!(
            "set_pitch: got {} times / {} values for {} frames",
            times.len(),
            values.len(),
            bundle.frames()
        )));
    }
    rebuild(bundle, Some(times.to_vec()), Some(values.to_vec()), None)
}

/// Multiply every temporal position by `factor`, stretching or compressing
/// the utterance without resampling spectral content.
pub fn scale_duration(bundle: &ParameterBundle, factor: f64) -> Result<ParameterBundle> {
    check_positive_factor("duration scale", factor)?;
    let times = bundle
        .temporal_positions()
        .iter()
        .map(|&t| t * factor)
        .collect();
    rebuild(bundle, Some(times), None, None)
}

/// Warp each frame's spectral envelope along the frequency axis.
///
/// New bin `k` takes the value of the original envelope at fractional
/// position `k ^ factor` (clamped to the row), so `factor = 1.0` is the exact
/// identity, `factor < 1.0` stretches formants upward and `factor > 1.0`
/// compresses them downward. The pitch-synchronous spectrogram no longer
/// corresponds to the warped envelope and is dropped.
pub fn warp_spectrum(bundle: &ParameterBundle, factor: f64) -> Result<ParameterBundle> {
    check_positive_factor("spectral warp", factor)?;
    let warped = bundle
        .spectrogram()
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|k| interp_at(row, (k as f64).powf(factor)))
                .collect()
        })
        .collect();
    rebuild(bundle, None, None, Some(warped))
}

fn check_positive_factor(what: &str, factor: f64) -> Result<()> {
    if factor > 0.0 && factor.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} factor {} must be positive and finite",
            what, factor
        )))
    }
}

/// Reassemble a bundle with some fields replaced, re-running validation.
fn rebuild(
    bundle: &ParameterBundle,
    times: Option<Vec<f64>>,
    f0: Option<Vec<f64>>,
    spectrogram: Option<Vec<Vec<f64>>>,
) -> Result<ParameterBundle> {
    let f0 = f0.unwrap_or_else(|| bundle.f0().to_vec());
    let vuv = f0.iter().map(|&f| f != 0.0).collect();
    let drops_ps = spectrogram.is_some();
    ParameterBundle::new(
        bundle.sample_rate(),
        bundle.frame_period(),
        bundle.fft_size(),
        times.unwrap_or_else(|| bundle.temporal_positions().to_vec()),
        f0,
        vuv,
        spectrogram.unwrap_or_else(|| bundle.spectrogram().to_vec()),
        bundle.aperiodicity().to_vec(),
        if drops_ps {
            None
        } else {
            bundle.ps_spectrogram().map(|ps| ps.to_vec())
        },
    )
}
