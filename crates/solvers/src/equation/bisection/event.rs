use tankfill_core::{EquationProblem, Model};

use crate::equation::EvaluateResult;

use super::Bracket;

/// Midpoint evaluation emitted by the bisection solver.
pub struct Event<'a, M, P>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    /// Iteration counter (1-based).
    pub iter: usize,

    /// The midpoint that was evaluated.
    pub x: f64,

    /// The bracket the midpoint was taken from.
    pub bracket: &'a Bracket,

    /// The result of the evaluation.
    pub result: &'a EvaluateResult<M, P, 1>,
}

impl<M, P> Event<'_, M, P>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    /// Returns the midpoint residual, or `NaN` if the evaluation failed.
    #[must_use]
    pub fn residual(&self) -> f64 {
        match self.result {
            Ok(eval) => eval.residuals[0],
            Err(_) => f64::NAN,
        }
    }
}
