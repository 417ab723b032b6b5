//! Tolerance constants for vocoder testing.
//!
//! Different stages warrant different precision: F0 estimators are judged
//! in Hz against the known pitch of a synthetic signal, while resynthesis
//! is judged perceptually (energy, length, relative pitch).

/// Absolute F0 error allowed on clean synthetic signals, in Hz.
pub const F0_TOLERANCE_HZ: f64 = 3.0;

/// Relative F0 error allowed after a full analysis/synthesis round trip.
/// Covers interpolation of the contour plus re-estimation on the output.
pub const F0_RELATIVE_TOLERANCE: f64 = 0.02;

/// Floating point rounding errors (exact operations: identity edits,
/// wholesale contour replacement).
pub const FLOAT_EPSILON: f64 = 1e-9;

/// RMS below this counts as silence (~-80 dB).
pub const SILENCE_THRESHOLD: f64 = 1e-4;

/// Minimum RMS for "there is a signal here" checks.
pub const MIN_SIGNAL_RMS: f64 = 1e-3;
