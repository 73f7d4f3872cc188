//! Core traits and types for tankfill.
//!
//! This crate defines the shared abstractions that the expression compiler,
//! the numeric solvers, and the fill-time solver build on:
//!
//! - [`Model`] — a callable that maps a typed input to a typed output
//! - [`Snapshot`] — a captured input/output pair from a model call
//! - [`Observer`] — receives solver events and optionally returns control actions
//! - [`EquationProblem`] — adapts solver variables to model inputs and
//!   computes residuals from outputs

mod model;
mod observer;
mod problems;

pub use observer::Observer;
pub use problems::EquationProblem;
pub use {model::Model, model::Snapshot};
