use std::{fmt, str::FromStr};

use meval::{ContextProvider, Expr, FuncEvalError, tokenizer::Token};

use tankfill_core::Model;

use crate::{
    compile::compile,
    error::{EvalError, InvalidExpressionError},
    function::{Builtin, constant},
    polynomial::Polynomial,
};

/// Name of the time variable used by [`RateFunction::compile`].
pub const DEFAULT_VARIABLE: &str = "t";

/// A compiled inflow-rate function `R(t)`.
///
/// Holds the source text alongside the parsed expression. Evaluation is pure
/// and the type is `Send + Sync`, so one compiled function can be shared
/// across threads and called any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct RateFunction {
    source: String,
    variable: String,
    expr: Expr,
}

impl RateFunction {
    /// Compiles `source` as a function of `t`.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidExpressionError`] if the text does not parse, names
    /// an unknown symbol or function, or calls a function with the wrong
    /// number of arguments.
    pub fn compile(source: &str) -> Result<Self, InvalidExpressionError> {
        Self::compile_with_variable(source, DEFAULT_VARIABLE)
    }

    /// Compiles `source` as a function of the named time variable.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidExpressionError`] if the text does not parse, names
    /// an unknown symbol or function, or calls a function with the wrong
    /// number of arguments.
    pub fn compile_with_variable(
        source: &str,
        variable: &str,
    ) -> Result<Self, InvalidExpressionError> {
        let expr = compile(source, variable)?;
        Ok(Self {
            source: source.to_owned(),
            variable: variable.to_owned(),
            expr,
        })
    }

    /// Returns the text the function was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the name of the time variable.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Returns false if the time variable does not appear in the expression.
    #[must_use]
    pub fn depends_on_time(&self) -> bool {
        self.expr
            .iter()
            .any(|token| matches!(token, Token::Var(name) if *name == self.variable))
    }

    /// Evaluates the rate at time `t`.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] when the rate is not finite at `t`.
    pub fn eval(&self, t: f64) -> Result<f64, EvalError> {
        let context = TimeContext {
            variable: &self.variable,
            t,
        };
        match self.expr.eval_with_context(context) {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(value) => Err(EvalError::NonFinite { t, value }),
            Err(err) => Err(EvalError::Failed {
                t,
                message: err.to_string(),
            }),
        }
    }

    /// Evaluates the rate at each time in `times`.
    ///
    /// The output has one entry per input, in order; a failure at one time
    /// does not affect the others.
    #[must_use]
    pub fn eval_slice(&self, times: &[f64]) -> Vec<Result<f64, EvalError>> {
        times.iter().map(|&t| self.eval(t)).collect()
    }

    /// Returns the rate as a polynomial in time, if it is one.
    #[must_use]
    pub fn polynomial(&self) -> Option<Polynomial> {
        Polynomial::from_rpn(&self.expr, &self.variable)
    }
}

/// Binds the time variable and resolves constants and built-ins.
#[derive(Clone, Copy)]
struct TimeContext<'a> {
    variable: &'a str,
    t: f64,
}

impl ContextProvider for TimeContext<'_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        if name == self.variable {
            Some(self.t)
        } else {
            constant(name)
        }
    }

    fn eval_func(&self, name: &str, args: &[f64]) -> Result<f64, FuncEvalError> {
        let builtin = Builtin::lookup(name).ok_or(FuncEvalError::UnknownFunction)?;
        builtin
            .call(args)
            .ok_or(FuncEvalError::NumberArgs(builtin.arity()))
    }
}

impl Model for RateFunction {
    type Input = f64;
    type Output = f64;
    type Error = EvalError;

    fn call(&self, t: &f64) -> Result<f64, Self::Error> {
        self.eval(*t)
    }
}

impl FromStr for RateFunction {
    type Err = InvalidExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for RateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R({}) = {}", self.variable, self.source.trim())
    }
}
