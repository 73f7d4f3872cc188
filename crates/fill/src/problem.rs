use std::convert::Infallible;

use tankfill_core::EquationProblem;

/// Frames `V(t) = C` as a root of `V(t) - C`.
///
/// The residual is negative before the tank is full and non-negative once it
/// is, which matches the bisection convention that a zero residual counts as
/// past the target.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FillProblem {
    capacity: f64,
}

impl FillProblem {
    pub(crate) fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    pub(crate) fn residual(&self, volume: f64) -> f64 {
        volume - self.capacity
    }
}

impl EquationProblem<1> for FillProblem {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(x[0])
    }

    fn residuals(&self, _input: &f64, volume: &f64) -> Result<[f64; 1], Self::Error> {
        Ok([self.residual(*volume)])
    }
}
