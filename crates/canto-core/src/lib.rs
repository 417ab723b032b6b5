//! # Canto Core
//!
//! Shared types for the canto vocoder:
//!
//! - [`ParameterBundle`] - the parametric representation of one utterance
//!   (time axis, F0 contour, voicing, spectral envelope, aperiodicity)
//! - [`F0Contour`] - intermediate output of the F0 estimators
//! - [`AnalysisConfig`] / [`F0Method`] - analysis configuration
//! - [`editor`] - pure, invariant-preserving edits (pitch scale/set,
//!   duration scale, spectral warp)
//! - [`dsp`] - window/interpolation helpers shared by the stages
//!
//! All functions operate on plain `&[f64]` sample buffers; audio file I/O and
//! visualization live outside this workspace.

pub mod bundle;
pub mod config;
pub mod dsp;
pub mod editor;
pub mod error;

pub use bundle::{F0Contour, ParameterBundle};
pub use config::{AnalysisConfig, F0Method, APERIODICITY_FLOOR, DEFAULT_F0, SAFE_GUARD_MINIMUM};
pub use error::{Error, Result};
