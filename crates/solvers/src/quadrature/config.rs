use thiserror::Error;

/// Configuration for adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Config {
    abs_tol: f64,
    rel_tol: f64,
    max_subdivisions: usize,
}

/// Errors that can occur when validating a quadrature config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("rel_tol must be finite and non-negative")]
    RelTol,

    #[error("abs_tol and rel_tol cannot both be zero")]
    ZeroTolerance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            rel_tol: 1e-8,
            max_subdivisions: 200,
        }
    }
}

impl Config {
    /// Creates a new config with validated tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, or if both
    /// tolerances are zero.
    pub fn new(abs_tol: f64, rel_tol: f64, max_subdivisions: usize) -> Result<Self, ConfigError> {
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if !rel_tol.is_finite() || rel_tol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        if abs_tol == 0.0 && rel_tol == 0.0 {
            return Err(ConfigError::ZeroTolerance);
        }

        Ok(Self {
            abs_tol,
            rel_tol,
            max_subdivisions,
        })
    }

    /// Returns the absolute error tolerance.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Returns the relative error tolerance.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the maximum number of interval bisections.
    #[must_use]
    pub fn max_subdivisions(&self) -> usize {
        self.max_subdivisions
    }

    /// Returns the acceptable total error for an integral of `value`.
    pub(super) fn target(&self, value: f64) -> f64 {
        self.abs_tol.max(self.rel_tol * value.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_tolerances() {
        assert_eq!(Config::new(-1.0, 1e-8, 10), Err(ConfigError::AbsTol));
        assert_eq!(Config::new(1e-8, f64::NAN, 10), Err(ConfigError::RelTol));
        assert_eq!(Config::new(0.0, 0.0, 10), Err(ConfigError::ZeroTolerance));
        assert!(Config::new(0.0, 1e-6, 10).is_ok());
    }

    #[test]
    fn target_is_larger_of_abs_and_rel() {
        let config = Config::new(1e-6, 1e-3, 10).expect("valid config");
        assert!((config.target(0.0) - 1e-6).abs() < 1e-18);
        assert!((config.target(-10.0) - 1e-2).abs() < 1e-15);
    }
}
