//! Bisection on a known bracket.
//!
//! # Algorithm
//!
//! The solver starts from a [`Bracket`] whose endpoint residuals have opposite
//! signs. Each iteration evaluates the midpoint and replaces the endpoint whose
//! residual sign matches the midpoint's, so the bracket always contains a sign
//! change. It stops once the bracket width satisfies the configured x
//! tolerances and reports the midpoint of the final bracket.
//!
//! A residual of exactly zero counts as positive. For a residual that grows
//! with `x` this means "at or past the target", so the right endpoint moves.
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] per midpoint evaluation, before the result
//! is applied. Observers can return [`Action::StopEarly`] to halt; the solution
//! then carries the bracket as it stood before that evaluation.

mod action;
mod bracket;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use bracket::{Bracket, BracketError, Sign};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use tankfill_core::{EquationProblem, Model, Observer};

use crate::equation::evaluate;

/// Finds a root of the equation by bisecting a known bracket.
///
/// The bracket endpoints are not re-evaluated; their residuals are taken from
/// the [`Bracket`] as constructed by the caller.
///
/// # Errors
///
/// Returns an error if the model or problem fails while evaluating a midpoint,
/// or if a midpoint residual is not finite.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: Bracket,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let mut bracket = bracket;

    for iter in 1..=config.max_iters() {
        if bracket.is_x_converged(config.x_abs_tol(), config.x_rel_tol()) {
            return Ok(Solution::new(Status::Converged, bracket, iter - 1));
        }

        let x = bracket.midpoint();
        let result = evaluate(model, problem, [x]);

        let event = Event {
            iter,
            x,
            bracket: &bracket,
            result: &result,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::new(Status::StoppedByObserver, bracket, iter - 1));
        }

        let residual = result?.residuals[0];
        if !residual.is_finite() {
            return Err(Error::NonFiniteResidual { x, residual });
        }

        bracket.shrink(x, residual);
    }

    let status = if bracket.is_x_converged(config.x_abs_tol(), config.x_rel_tol()) {
        Status::Converged
    } else {
        Status::MaxIters
    };
    Ok(Solution::new(status, bracket, config.max_iters()))
}

/// Runs bisection without observation.
///
/// # Errors
///
/// Returns an error if the model or problem fails while evaluating a midpoint,
/// or if a midpoint residual is not finite.
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    bracket: Bracket,
    config: &Config,
) -> Result<Solution, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    solve(model, problem, bracket, config, ())
}
