use super::Bracket;

/// Indicates whether the solver converged or hit the iteration limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a bisection solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Midpoint of the final bracket.
    pub x: f64,

    /// Final bracket, with the residuals at its bounds.
    pub bracket: Bracket,

    /// Number of midpoints evaluated.
    pub iters: usize,
}

impl Solution {
    pub(super) fn new(status: Status, bracket: Bracket, iters: usize) -> Self {
        Self {
            status,
            x: bracket.midpoint(),
            bracket,
            iters,
        }
    }
}
