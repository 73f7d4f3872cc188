//! Rate-function expressions for tankfill.
//!
//! [`RateFunction::compile`] turns text such as `"2*t + 3*sin(t)"` into a
//! function of one time variable that can be evaluated many times without
//! re-parsing. Parsing and evaluation are done by [`meval`], which keeps the
//! expression in reverse Polish notation, so neither deep nesting nor long
//! sums grow the call stack. Compiled functions implement [`Model`] so the
//! generic solvers can call them directly.
//!
//! # Syntax
//!
//! - Numbers: `2`, `0.5`, `2.`, `1e-3`
//! - The time variable (`t` unless another name is given)
//! - Constants: `pi`, `e` (also `E`)
//! - Operators: `+ - * / %`, and `^` or `**` for powers (right-associative)
//! - Functions: `sin cos tan asin acos atan sinh cosh tanh exp ln log log10
//!   log2 sqrt abs floor ceil sign` (one argument) and `min max atan2 pow`
//!   (two arguments); `log` is the natural logarithm
//!
//! Multiplication is always written out: `2*t`, not `2t`.
//!
//! [`Model`]: tankfill_core::Model

mod compile;
mod error;
mod function;
mod polynomial;
mod rate;

pub use error::{EvalError, InvalidExpressionError, ParseErrorKind};
pub use polynomial::Polynomial;
pub use rate::{DEFAULT_VARIABLE, RateFunction};
