//! F0 estimation.
//!
//! Two interchangeable variants behind [`canto_core::F0Method`]:
//!
//! - [`fast`] - cheap multi-band zero-crossing estimator, always followed by
//!   the spectral [`refine`] pass,
//! - [`robust`] - higher-accuracy single-pass harmonic estimator.

pub mod fast;
pub mod refine;
pub mod robust;
