//! Numerical solvers for tankfill.
//!
//! - [`equation`] — root finding for [`EquationProblem`]s
//! - [`quadrature`] — adaptive numerical integration of scalar models
//!
//! [`EquationProblem`]: tankfill_core::EquationProblem

pub mod equation;
pub mod quadrature;
