/// The result of an adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Estimated integral.
    pub value: f64,

    /// Estimated absolute error of `value`.
    pub error: f64,

    /// Number of integrand evaluations.
    pub evaluations: usize,

    /// Number of interval bisections performed.
    pub subdivisions: usize,
}

impl Solution {
    pub(super) fn empty() -> Self {
        Self {
            value: 0.0,
            error: 0.0,
            evaluations: 0,
            subdivisions: 0,
        }
    }

    pub(super) fn negate(self) -> Self {
        Self {
            value: -self.value,
            ..self
        }
    }
}
