use std::time::Duration;

use thiserror::Error;

use tankfill_solvers::{equation::bisection, quadrature};

use crate::cancel::CancelToken;

/// Default upper limit on the fill time search.
pub const DEFAULT_MAX_TIME: f64 = 100.0;

/// Default width of the final fill time bracket.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Default limit on bisection iterations.
pub const DEFAULT_MAX_BISECTION_ITERS: usize = 200;

/// Errors that can occur when validating solve inputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OptionsError {
    #[error("capacity must be finite and non-negative, got {0}")]
    Capacity(f64),

    #[error("max_time must be finite and positive, got {0}")]
    MaxTime(f64),

    #[error("tolerance must be finite and positive, got {0}")]
    Tolerance(f64),

    #[error("max_bisection_iters must be at least 1")]
    MaxBisectionIters,
}

/// How negative rates contribute to the volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RatePolicy {
    /// Integrate the signed rate; negative rates drain the tank.
    #[default]
    Net,
    /// Integrate `max(R(t), 0)`; negative rates add nothing.
    InflowOnly,
}

/// A tank capacity, finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Capacity(f64);

impl Capacity {
    /// Creates a validated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Capacity`] if `value` is negative or not finite.
    pub fn new(value: f64) -> Result<Self, OptionsError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(OptionsError::Capacity(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Capacity {
    type Error = OptionsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Options for a fill time solve.
///
/// Numeric settings are validated on construction; use the `with_*` methods
/// to adjust the rest.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolveOptions {
    max_time: f64,
    tolerance: f64,
    rate_policy: RatePolicy,
    quadrature: quadrature::Config,
    max_bisection_iters: usize,
    time_limit: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(skip))]
    cancel: Option<CancelToken>,
}

impl SolveOptions {
    /// Creates options with the given horizon and fill time tolerance.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionsError`] if either value is non-finite or not
    /// strictly positive.
    pub fn new(max_time: f64, tolerance: f64) -> Result<Self, OptionsError> {
        if !max_time.is_finite() || max_time <= 0.0 {
            return Err(OptionsError::MaxTime(max_time));
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(OptionsError::Tolerance(tolerance));
        }
        Ok(Self {
            max_time,
            tolerance,
            rate_policy: RatePolicy::default(),
            quadrature: quadrature::Config::default(),
            max_bisection_iters: DEFAULT_MAX_BISECTION_ITERS,
            time_limit: None,
            cancel: None,
        })
    }

    /// Sets how negative rates are integrated.
    #[must_use]
    pub fn with_rate_policy(mut self, rate_policy: RatePolicy) -> Self {
        self.rate_policy = rate_policy;
        self
    }

    /// Sets the quadrature configuration used for every volume evaluation.
    #[must_use]
    pub fn with_quadrature(mut self, quadrature: quadrature::Config) -> Self {
        self.quadrature = quadrature;
        self
    }

    /// Sets the bisection iteration limit.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::MaxBisectionIters`] if `max_iters` is zero.
    pub fn with_max_bisection_iters(mut self, max_iters: usize) -> Result<Self, OptionsError> {
        if max_iters == 0 {
            return Err(OptionsError::MaxBisectionIters);
        }
        self.max_bisection_iters = max_iters;
        Ok(self)
    }

    /// Stops the solve once `limit` has elapsed from its start.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Stops the solve once `token` is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn rate_policy(&self) -> RatePolicy {
        self.rate_policy
    }

    #[must_use]
    pub fn quadrature(&self) -> &quadrature::Config {
        &self.quadrature
    }

    #[must_use]
    pub fn max_bisection_iters(&self) -> usize {
        self.max_bisection_iters
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[must_use]
    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// Builds the bisection configuration: stop once the bracket is no wider
    /// than the tolerance.
    pub(crate) fn bisection_config(&self) -> Result<bisection::Config, OptionsError> {
        bisection::Config::new(self.max_bisection_iters, self.tolerance, 0.0)
            .map_err(|_| OptionsError::Tolerance(self.tolerance))
    }
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_time: DEFAULT_MAX_TIME,
            tolerance: DEFAULT_TOLERANCE,
            rate_policy: RatePolicy::default(),
            quadrature: quadrature::Config::default(),
            max_bisection_iters: DEFAULT_MAX_BISECTION_ITERS,
            time_limit: None,
            cancel: None,
        }
    }
}
