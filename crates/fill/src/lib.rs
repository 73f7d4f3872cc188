//! Time to fill a tank from a time-varying inflow rate.
//!
//! Given a rate `R(t)` and a capacity `C`, finds the first `t*` with
//! `∫₀^t* R(t) dt = C`. The volume is integrated with adaptive Gauss–Kronrod
//! quadrature; the crossing is bracketed by doubling an upper bound and then
//! refined by bisection. Constant and linear rates are solved in closed form
//! first.
//!
//! ```
//! use tankfill::{SolveOptions, fill_time};
//!
//! let fill = fill_time("2*t", 50.0, &SolveOptions::default()).unwrap();
//! assert_eq!(fill.to_string(), "7.07");
//! ```

mod cancel;
mod error;
mod expand;
mod numeric;
mod options;
mod preset;
mod problem;
mod result;
mod sample;
mod strategy;
mod symbolic;
mod volume;

pub use cancel::{CancelReason, CancelToken};
pub use error::{ErrorKind, FillError, IntegrationError, error_chain};
pub use numeric::solve;
pub use options::{
    Capacity, DEFAULT_MAX_BISECTION_ITERS, DEFAULT_MAX_TIME, DEFAULT_TOLERANCE, OptionsError,
    RatePolicy, SolveOptions,
};
pub use preset::{DEFAULT_CAPACITY, DEFAULT_CUSTOM_EXPRESSION, FlowPreset, UnknownPreset};
pub use result::{FillTime, Method};
pub use sample::{
    DEFAULT_MARGIN, DEFAULT_SAMPLE_POINTS, RateSamples, SkipReason, SkippedSample,
    sample_for_chart, sample_rate,
};
pub use strategy::{
    DEFAULT_STRATEGIES, FillStrategy, NumericSolve, StrategyOutcome, fill_time, solve_fill_time,
    solve_with,
};
pub use symbolic::SymbolicSolve;
pub use volume::{VolumeSample, volume_up_to};

pub use tankfill_expr::{InvalidExpressionError, RateFunction};
pub use tankfill_solvers::quadrature::Config as QuadratureConfig;
