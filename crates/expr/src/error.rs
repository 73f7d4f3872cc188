use thiserror::Error;

/// A rate expression that could not be compiled.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid expression `{expression}`: {kind}")]
pub struct InvalidExpressionError {
    expression: String,
    position: Option<usize>,
    kind: ParseErrorKind,
}

impl InvalidExpressionError {
    pub(crate) fn new(expression: &str, position: Option<usize>, kind: ParseErrorKind) -> Self {
        Self {
            expression: expression.to_owned(),
            position,
            kind,
        }
    }

    /// Returns the expression text that failed to compile.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns the byte offset of the offending input, if there is one.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns what went wrong.
    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// The reason an expression failed to compile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected `{0}`")]
    UnexpectedChar(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,

    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{0}` must be called with parentheses")]
    MissingArguments(String),

    #[error("`{name}` takes {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed expression: {0}")]
    Malformed(String),
}

/// Errors raised while evaluating a compiled rate function.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("rate is not finite at t = {t}: {value}")]
    NonFinite { t: f64, value: f64 },

    #[error("rate evaluation failed at t = {t}: {message}")]
    Failed { t: f64, message: String },
}
