//! # Canto - Speech Analysis/Resynthesis Vocoder
//!
//! Decomposes a sampled speech waveform into a compact parametric
//! representation - F0 contour, voicing, spectral envelope, aperiodicity -
//! and reconstructs a waveform from it, optionally after editing the
//! parameters.
//!
//! ## Architecture
//!
//! Canto is an umbrella crate that coordinates:
//! - **canto-core** - parameter bundle, configuration, editor operations
//! - **canto-analysis** - F0 / envelope / aperiodicity estimation
//! - **canto-synth** - pitch-synchronous overlap-add synthesis
//!
//! ## Quick Start
//!
//! ```ignore
//! use canto::prelude::*;
//!
//! let engine = CantoEngine::builder()
//!     .f0_method(F0Method::Fast)
//!     .frame_period(0.005)
//!     .build()?;
//!
//! // samples: Vec<f64> in [-1, 1], from whatever audio source you use
//! let bundle = engine.analyze(&samples, 16000)?;
//!
//! // Edit, then resynthesize
//! let up = editor::scale_pitch(&bundle, 1.5)?;
//! let wave = engine.synthesize(&up)?;
//! ```
//!
//! Audio file I/O and visualization are intentionally outside this
//! workspace; the engine consumes `(samples, sample_rate)` and exposes read
//! access to every bundle field.

/// Re-export of canto-core for direct access
pub use canto_core as core;

/// Re-export of canto-analysis for direct access
pub use canto_analysis as analysis;

/// Re-export of canto-synth for direct access
pub use canto_synth as synth;

pub use canto_core::{
    editor, AnalysisConfig, Error, F0Contour, F0Method, ParameterBundle, Result,
    APERIODICITY_FLOOR, DEFAULT_F0,
};

mod builder;
mod engine;

pub use builder::CantoEngineBuilder;
pub use engine::{CantoEngine, SpectrumEstimate};

/// Common imports for vocoder pipelines.
pub mod prelude {
    pub use crate::editor;
    pub use crate::{
        AnalysisConfig, CantoEngine, CantoEngineBuilder, Error, F0Contour, F0Method,
        ParameterBundle, Result, SpectrumEstimate,
    };
}
