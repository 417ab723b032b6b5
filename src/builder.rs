//! Builder for configuring and constructing a `CantoEngine`.

use crate::engine::CantoEngine;
use crate::{AnalysisConfig, F0Method, Result};

/// Configures an analysis/synthesis engine.
///
/// Every knob has a conventional default (5 ms frames, 71-800 Hz pitch
/// range, fast F0 method, derived FFT size); `build` validates the combined
/// configuration.
///
/// # Example
///
/// ```ignore
/// use canto::prelude::*;
///
/// let engine = CantoEngine::builder()
///     .f0_method(F0Method::Robust)
///     .f0_floor(60.0)
///     .f0_ceil(400.0)
///     .build()?;
/// ```
pub struct CantoEngineBuilder {
    config: AnalysisConfig,
    method: F0Method,
}

impl Default for CantoEngineBuilder {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            method: F0Method::default(),
        }
    }
}

impl CantoEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame period in seconds (default 0.005).
    pub fn frame_period(mut self, seconds: f64) -> Self {
        self.config.frame_period = seconds;
        self
    }

    /// Lowest reported F0 in Hz (default 71).
    pub fn f0_floor(mut self, hz: f64) -> Self {
        self.config.f0_floor = hz;
        self
    }

    /// Highest reported F0 in Hz (default 800).
    pub fn f0_ceil(mut self, hz: f64) -> Self {
        self.config.f0_ceil = hz;
        self
    }

    /// Spectrogram FFT size; unset derives it from the sample rate.
    pub fn fft_size(mut self, fft_size: usize) -> Self {
        self.config.fft_size = Some(fft_size);
        self
    }

    /// F0 estimation method (default [`F0Method::Fast`]).
    pub fn f0_method(mut self, method: F0Method) -> Self {
        self.method = method;
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> Result<CantoEngine> {
        self.config.validate()?;
        Ok(CantoEngine::new(self.config, self.method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let engine = CantoEngineBuilder::new().build().unwrap();
        assert_eq!(engine.f0_method(), F0Method::Fast);
        assert_eq!(engine.config().frame_period, 0.005);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(CantoEngineBuilder::new().frame_period(-1.0).build().is_err());
        assert!(CantoEngineBuilder::new().fft_size(1000).build().is_err());
        assert!(CantoEngineBuilder::new()
            .f0_floor(500.0)
            .f0_ceil(100.0)
            .build()
            .is_err());
    }
}
