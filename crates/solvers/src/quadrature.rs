//! Adaptive Gauss–Kronrod quadrature for scalar models.
//!
//! # Algorithm
//!
//! Each interval is integrated with a 15-point Kronrod rule and its embedded
//! 7-point Gauss rule; the difference between the two is the interval's error
//! estimate. The solver keeps every interval in a max-heap keyed by error and
//! repeatedly bisects the worst one until the summed error satisfies
//! `error <= max(abs_tol, rel_tol * |value|)`.
//!
//! # Limitations
//!
//! - Endpoints must be finite; infinite ranges are not mapped.
//! - Integrable singularities inside the range converge slowly and will
//!   usually hit the subdivision limit.

mod config;
mod error;
mod rule;
mod solution;

pub use config::{Config, ConfigError};
pub use error::Error;
pub use solution::Solution;

use std::collections::BinaryHeap;

use tankfill_core::Model;

use rule::Segment;

/// Integrates `model` over `[bounds[0], bounds[1]]`.
///
/// Reversed bounds integrate with the sign flipped. Equal bounds return zero
/// without calling the model.
///
/// # Errors
///
/// Returns an error if a bound is non-finite, the model fails or returns a
/// non-finite value, or the error target is not met within the configured
/// number of subdivisions.
pub fn integrate<M>(model: &M, bounds: [f64; 2], config: &Config) -> Result<Solution, Error>
where
    M: Model<Input = f64, Output = f64>,
{
    let [a, b] = bounds;
    if !a.is_finite() {
        return Err(Error::NonFiniteBound { value: a });
    }
    if !b.is_finite() {
        return Err(Error::NonFiniteBound { value: b });
    }

    #[allow(clippy::float_cmp)]
    if a == b {
        return Ok(Solution::empty());
    }

    if a > b {
        return integrate(model, [b, a], config).map(Solution::negate);
    }

    let first = Segment::integrate(model, a, b)?;
    let mut evaluations = rule::POINTS;
    let mut segments = BinaryHeap::from([first]);

    loop {
        let (value, error) = segments
            .iter()
            .fold((0.0, 0.0), |(v, e), s| (v + s.value, e + s.error));

        if error <= config.target(value) {
            return Ok(Solution {
                value,
                error,
                evaluations,
                subdivisions: segments.len() - 1,
            });
        }

        if segments.len() > config.max_subdivisions() {
            return Err(Error::NotConverged {
                value,
                error,
                subdivisions: segments.len() - 1,
            });
        }

        let Some(worst) = segments.pop() else {
            return Err(Error::NotConverged {
                value,
                error,
                subdivisions: 0,
            });
        };
        let mid = 0.5 * (worst.a + worst.b);
        if mid <= worst.a || mid >= worst.b {
            // Interval can no longer be split in floating point.
            return Err(Error::NotConverged {
                value,
                error,
                subdivisions: segments.len(),
            });
        }

        segments.push(Segment::integrate(model, worst.a, mid)?);
        segments.push(Segment::integrate(model, mid, worst.b)?);
        evaluations += 2 * rule::POINTS;
    }
}
