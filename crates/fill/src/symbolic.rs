//! Closed-form fill times for constant and linear rates.

use tankfill_expr::RateFunction;

use crate::{
    error::FillError,
    options::{Capacity, RatePolicy, SolveOptions},
    result::{FillTime, Method},
    strategy::{FillStrategy, StrategyOutcome},
};

/// Solves `c₀t + c₁t²/2 = C` exactly for rates `R(t) = c₀ + c₁t`.
///
/// Declines any rate that is not a polynomial of degree one or less, a
/// crossing past the horizon, and, under [`RatePolicy::InflowOnly`], a rate
/// that is negative somewhere before the crossing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicSolve;

impl FillStrategy for SymbolicSolve {
    fn method(&self) -> Method {
        Method::Symbolic
    }

    fn attempt(
        &self,
        rate: &RateFunction,
        capacity: Capacity,
        options: &SolveOptions,
    ) -> Result<StrategyOutcome, FillError> {
        let Some(polynomial) = rate.polynomial() else {
            return Ok(StrategyOutcome::Unsupported("rate is not a polynomial in time"));
        };
        if polynomial.degree() > 1 {
            return Ok(StrategyOutcome::Unsupported(
                "closed form needs a constant or linear rate",
            ));
        }

        let c0 = polynomial.coefficient(0);
        let volume = polynomial.antiderivative();
        let Some(time) = first_positive_root(
            volume.coefficient(2),
            volume.coefficient(1),
            -capacity.value(),
        ) else {
            return Ok(StrategyOutcome::Unsupported("volume never reaches capacity"));
        };
        if time > options.max_time() {
            return Ok(StrategyOutcome::Unsupported("crossing lies beyond the horizon"));
        }
        if options.rate_policy() == RatePolicy::InflowOnly
            && (c0 < 0.0 || polynomial.eval(time) < 0.0)
        {
            return Ok(StrategyOutcome::Unsupported(
                "rate is negative before the crossing",
            ));
        }

        Ok(StrategyOutcome::Solved(FillTime {
            time,
            method: Method::Symbolic,
            bracket: [time, time],
            volume_error: 0.0,
            precision: f64::EPSILON * time.max(1.0),
            volume_samples: 0,
            evaluations: 0,
            monotone: c0 >= 0.0 && polynomial.eval(time) >= 0.0,
        }))
    }
}

/// Returns the smallest positive root of `a·t² + b·t + c`.
fn first_positive_root(a: f64, b: f64, c: f64) -> Option<f64> {
    let roots = if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        [-c / b, f64::NAN]
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        // Avoids cancellation between b and the square root.
        let q = -0.5 * (b + b.signum() * discriminant.sqrt());
        if q == 0.0 {
            [0.0, f64::NAN]
        } else {
            [q / a, c / q]
        }
    };

    roots
        .into_iter()
        .filter(|t| t.is_finite() && *t > 0.0)
        .min_by(f64::total_cmp)
}
