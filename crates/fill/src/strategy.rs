//! Ordered solve strategies with fallback.

use tracing::{debug, info};

use tankfill_expr::RateFunction;

use crate::{
    error::FillError,
    numeric,
    options::{Capacity, SolveOptions},
    result::{FillTime, Method},
    symbolic::SymbolicSolve,
};

/// The result of asking one strategy to solve a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// The strategy produced a fill time.
    Solved(FillTime),
    /// The strategy cannot handle this problem; try the next one.
    Unsupported(&'static str),
}

/// One way of solving for a fill time.
///
/// Strategies are tried in order by [`solve_with`]. A strategy that cannot
/// handle a rate returns [`StrategyOutcome::Unsupported`] instead of an error,
/// so later strategies still get a chance.
pub trait FillStrategy {
    /// The method reported by fill times this strategy produces.
    fn method(&self) -> Method;

    /// Attempts to solve for a positive capacity.
    ///
    /// # Errors
    ///
    /// Returns a [`FillError`] for failures that no other strategy could
    /// recover from.
    fn attempt(
        &self,
        rate: &RateFunction,
        capacity: Capacity,
        options: &SolveOptions,
    ) -> Result<StrategyOutcome, FillError>;
}

/// Quadrature with bracket doubling and bisection. Handles every rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericSolve;

impl FillStrategy for NumericSolve {
    fn method(&self) -> Method {
        Method::Numeric
    }

    fn attempt(
        &self,
        rate: &RateFunction,
        capacity: Capacity,
        options: &SolveOptions,
    ) -> Result<StrategyOutcome, FillError> {
        numeric::solve_positive(rate, capacity, options).map(StrategyOutcome::Solved)
    }
}

/// The default chain: closed form first, then numeric.
pub const DEFAULT_STRATEGIES: &[&dyn FillStrategy] = &[&SymbolicSolve, &NumericSolve];

/// Compiles `expression` and solves for its fill time.
///
/// # Errors
///
/// Returns [`FillError::InvalidExpression`] if the expression does not
/// compile, or any error from [`solve_fill_time`].
pub fn fill_time(
    expression: &str,
    capacity: f64,
    options: &SolveOptions,
) -> Result<FillTime, FillError> {
    let rate = RateFunction::compile(expression)?;
    solve_fill_time(&rate, capacity, options)
}

/// Solves for the fill time of a compiled rate using [`DEFAULT_STRATEGIES`].
///
/// # Errors
///
/// Returns a [`FillError`] if the capacity is invalid, the volume cannot be
/// integrated, the tank does not fill by `options.max_time()`, or the solve is
/// cancelled.
pub fn solve_fill_time(
    rate: &RateFunction,
    capacity: f64,
    options: &SolveOptions,
) -> Result<FillTime, FillError> {
    solve_with(DEFAULT_STRATEGIES, rate, capacity, options)
}

/// Solves for the fill time by trying each strategy in order.
///
/// A zero capacity is full at `t = 0` and skips the strategies entirely.
///
/// # Errors
///
/// Returns the first error a strategy raises, or
/// [`FillError::NoApplicableStrategy`] if every strategy declines.
pub fn solve_with(
    strategies: &[&dyn FillStrategy],
    rate: &RateFunction,
    capacity: f64,
    options: &SolveOptions,
) -> Result<FillTime, FillError> {
    let capacity = Capacity::new(capacity)?;
    if capacity.is_zero() {
        return Ok(FillTime::immediate());
    }

    for strategy in strategies {
        match strategy.attempt(rate, capacity, options)? {
            StrategyOutcome::Solved(fill) => {
                info!(
                    method = %fill.method,
                    time = fill.time,
                    samples = fill.volume_samples,
                    "fill time solved"
                );
                return Ok(fill);
            }
            StrategyOutcome::Unsupported(reason) => {
                debug!(method = %strategy.method(), reason, "strategy declined");
            }
        }
    }
    Err(FillError::NoApplicableStrategy)
}
