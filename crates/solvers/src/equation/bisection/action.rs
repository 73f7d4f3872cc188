/// Control actions supported by the bisection solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver and return the bracket as it currently stands.
    StopEarly,
}
