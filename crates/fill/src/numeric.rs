//! Fill time by quadrature, bracket doubling, and bisection.

use tracing::{debug, warn};

use tankfill_core::{EquationProblem, Model, Observer};
use tankfill_solvers::equation::bisection::{self, Status};

use crate::{
    cancel::{CancelReason, Interrupt},
    error::FillError,
    expand::discover,
    options::{Capacity, SolveOptions},
    problem::FillProblem,
    result::{FillTime, Method},
    volume::CumulativeVolume,
};

/// Solves for the first time the volume delivered by `rate` reaches
/// `capacity`, using numeric integration only.
///
/// Works with any scalar rate model. For compiled expressions,
/// [`solve_fill_time`](crate::solve_fill_time) tries a closed form first.
///
/// # Errors
///
/// Returns a [`FillError`] if the capacity is invalid, the volume cannot be
/// integrated, the tank does not fill by `options.max_time()`, or the solve is
/// cancelled.
pub fn solve<R>(rate: &R, capacity: f64, options: &SolveOptions) -> Result<FillTime, FillError>
where
    R: Model<Input = f64, Output = f64>,
{
    let capacity = Capacity::new(capacity)?;
    if capacity.is_zero() {
        return Ok(FillTime::immediate());
    }
    solve_positive(rate, capacity, options)
}

/// Numeric solve for a capacity already known to be positive.
pub(crate) fn solve_positive<R>(
    rate: &R,
    capacity: Capacity,
    options: &SolveOptions,
) -> Result<FillTime, FillError>
where
    R: Model<Input = f64, Output = f64>,
{
    let config = options.bisection_config()?;
    let interrupt = Interrupt::start(options);
    let volume = CumulativeVolume::new(rate, options.rate_policy(), options.quadrature());
    let problem = FillProblem::new(capacity.value());

    let bracket = discover(
        &volume,
        &problem,
        capacity.value(),
        options.max_time(),
        &interrupt,
    )?;
    debug!(bracket = ?bracket.bounds(), samples = volume.sample_count(), "bracket found");

    let solution = bisection::solve(&volume, &problem, bracket, &config, StepLog { interrupt })?;
    match solution.status {
        Status::Converged => {}
        Status::StoppedByObserver => {
            let reason = interrupt.check().unwrap_or(CancelReason::Token);
            return Err(FillError::Cancelled { reason });
        }
        Status::MaxIters => {
            warn!(
                iters = solution.iters,
                width = solution.bracket.width(),
                "bisection hit its iteration limit before reaching the tolerance"
            );
        }
    }

    let [low, high] = solution.bracket.bounds();
    let [low_residual, high_residual] = solution.bracket.residuals();
    let volume_error = [low, high]
        .into_iter()
        .filter_map(|t| volume.cached(t))
        .map(|sample| sample.error)
        .fold(0.0, f64::max);

    let slope = (high_residual - low_residual) / (high - low);
    let implied = if slope > 0.0 {
        volume_error / slope
    } else {
        f64::INFINITY
    };
    let precision = options.tolerance().max(0.5 * (high - low)).max(implied);

    let fill = FillTime {
        time: solution.x,
        method: Method::Numeric,
        bracket: [low, high],
        volume_error,
        precision,
        volume_samples: volume.sample_count(),
        evaluations: volume.evaluations(),
        monotone: volume.is_monotone(),
    };
    debug!(
        time = fill.time,
        precision = fill.precision,
        iters = solution.iters,
        evaluations = fill.evaluations,
        "numeric solve finished"
    );
    Ok(fill)
}

/// Logs each bisection step and stops the iteration once interrupted.
struct StepLog<'a> {
    interrupt: Interrupt<'a>,
}

impl<M, P> Observer<bisection::Event<'_, M, P>, bisection::Action> for StepLog<'_>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    fn observe(&mut self, event: &bisection::Event<'_, M, P>) -> Option<bisection::Action> {
        debug!(
            iter = event.iter,
            t = event.x,
            residual = event.residual(),
            width = event.bracket.width(),
            "bisection step"
        );
        self.interrupt
            .check()
            .map(|_| bisection::Action::StopEarly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use approx::assert_relative_eq;

    use tankfill_expr::RateFunction;

    use crate::{CancelToken, ErrorKind, RatePolicy};

    fn rate(expr: &str) -> RateFunction {
        RateFunction::compile(expr).unwrap()
    }

    #[test]
    fn constant_rate() {
        let fill = solve(&rate("5"), 50.0, &SolveOptions::default()).unwrap();
        assert_eq!(fill.method, Method::Numeric);
        assert_relative_eq!(fill.time, 10.0, epsilon = 0.01);
        assert_eq!(fill.to_string(), "10.00");
        assert!(fill.bracket[1] - fill.bracket[0] <= 0.01);
        assert!(fill.bracket[0] <= 10.0 && 10.0 <= fill.bracket[1]);
        assert!(fill.monotone);
    }

    #[test]
    fn linear_rate() {
        let fill = solve(&rate("2*t"), 50.0, &SolveOptions::default()).unwrap();
        assert_relative_eq!(fill.time, 50.0_f64.sqrt(), epsilon = 0.01);
        assert_eq!(fill.to_string(), "7.07");
    }

    #[test]
    fn precision_is_at_least_the_tolerance() {
        let options = SolveOptions::new(100.0, 0.25).unwrap();
        let fill = solve(&rate("5"), 50.0, &options).unwrap();
        assert!(fill.precision >= 0.25);
        assert!(fill.volume_error >= 0.0);
        assert!(fill.volume_samples > 0);
        assert!(fill.evaluations > 0);
    }

    #[test]
    fn zero_capacity_is_immediate() {
        let fill = solve(&rate("1/t"), 0.0, &SolveOptions::default()).unwrap();
        assert_eq!(fill.time, 0.0);
        assert_eq!(fill.method, Method::Immediate);
    }

    #[test]
    fn negative_capacity_is_invalid() {
        let err = solve(&rate("5"), -1.0, &SolveOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOptions);
    }

    #[test]
    fn never_fills_within_horizon() {
        let options = SolveOptions::new(10.0, 0.01).unwrap();
        let err = solve(&rate("0"), 1.0, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NeverFills);
    }

    #[test]
    fn draining_rate_fills_under_inflow_only() {
        // Net volume of 10 - t peaks at 50 (t = 10) and never reaches 60.
        let net = SolveOptions::default();
        let err = solve(&rate("10 - t"), 60.0, &net).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NeverFills);

        // Clamped, the volume also stops growing at 50.
        let inflow = SolveOptions::default().with_rate_policy(RatePolicy::InflowOnly);
        let err = solve(&rate("10 - t"), 60.0, &inflow).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NeverFills);

        // A rate that dips negative early, then recovers.
        let fill = solve(&rate("t - 2"), 8.0, &inflow).unwrap();
        assert_relative_eq!(fill.time, 6.0, epsilon = 0.01);
    }

    #[test]
    fn stepping_over_a_brief_fill_is_flagged() {
        // V(t) = 10t - t²/2 reaches 49.9 near t = 9.55, between the doublings to 8 and 16.
        let err = solve(&rate("10 - t"), 49.9, &SolveOptions::default()).unwrap_err();
        match err {
            FillError::NeverFills {
                max_volume_seen,
                monotone,
                ..
            } => {
                assert!(!monotone);
                assert_relative_eq!(max_volume_seen, 48.0, epsilon = 1e-9);
            }
            other => panic!("expected NeverFills, got {other:?}"),
        }
    }

    #[test]
    fn step_log_stops_bisection_once_interrupted() {
        let rate = rate("5");
        let token = CancelToken::new();
        let options = SolveOptions::default().with_cancel_token(token.clone());
        let volume = CumulativeVolume::new(&rate, RatePolicy::Net, options.quadrature());
        let problem = FillProblem::new(50.0);
        let config = options.bisection_config().unwrap();
        let bracket = || bisection::Bracket::new([8.0, 16.0], [-10.0, 30.0]).unwrap();

        let observer = StepLog {
            interrupt: Interrupt::start(&options),
        };
        let solution = bisection::solve(&volume, &problem, bracket(), &config, observer).unwrap();
        assert_eq!(solution.status, Status::Converged);

        token.cancel();
        let observer = StepLog {
            interrupt: Interrupt::start(&options),
        };
        let solution = bisection::solve(&volume, &problem, bracket(), &config, observer).unwrap();
        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.iters, 0);
    }

    #[test]
    fn integration_errors_surface() {
        let err = solve(&rate("1/(t-1)"), 50.0, &SolveOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integration);
    }

    #[test]
    fn max_iters_returns_best_bracket() {
        let options = SolveOptions::new(100.0, 1e-9)
            .unwrap()
            .with_max_bisection_iters(3)
            .unwrap();
        let fill = solve(&rate("5"), 50.0, &options).unwrap();

        // [8, 16] bisected three times leaves a width of 1.
        assert_relative_eq!(fill.bracket[1] - fill.bracket[0], 1.0);
        assert!(fill.bracket[0] <= 10.0 && 10.0 <= fill.bracket[1]);
        assert!(fill.precision >= 0.5);
    }

    #[test]
    fn cancelled_token_stops_the_solve() {
        let token = CancelToken::new();
        token.cancel();
        let options = SolveOptions::default().with_cancel_token(token);
        let err = solve(&rate("5"), 50.0, &options).unwrap_err();
        assert!(matches!(
            err,
            FillError::Cancelled {
                reason: CancelReason::Token
            }
        ));
    }

    #[test]
    fn elapsed_time_limit_stops_the_solve() {
        let options = SolveOptions::default().with_time_limit(Duration::ZERO);
        let err = solve(&rate("5"), 50.0, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn generic_rate_models_are_accepted() {
        struct Constant(f64);

        impl Model for Constant {
            type Input = f64;
            type Output = f64;
            type Error = std::convert::Infallible;

            fn call(&self, _t: &f64) -> Result<f64, Self::Error> {
                Ok(self.0)
            }
        }

        let fill = solve(&Constant(2.0), 10.0, &SolveOptions::default()).unwrap();
        assert_relative_eq!(fill.time, 5.0, epsilon = 0.01);
    }
}
