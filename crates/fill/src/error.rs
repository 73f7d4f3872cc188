use std::error::Error as StdError;

use thiserror::Error;

use tankfill_expr::InvalidExpressionError;
use tankfill_solvers::{
    equation::bisection::{self, BracketError},
    quadrature,
};

use crate::{cancel::CancelReason, options::OptionsError};

/// Errors that can occur while computing a cumulative volume.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("upper bound must be finite and non-negative, got {u}")]
    InvalidBound { u: f64 },

    #[error(transparent)]
    Quadrature(#[from] quadrature::Error),
}

/// Errors that can occur while solving for a fill time.
#[derive(Debug, Error)]
pub enum FillError {
    #[error(transparent)]
    InvalidExpression(#[from] InvalidExpressionError),

    #[error("integration failed")]
    Integration(#[from] IntegrationError),

    /// The volume at `max_time` is still short of capacity.
    ///
    /// When `monotone` is false the volume fell somewhere, so the tank
    /// may still fill briefly at a time the doubling stepped over; an
    /// [`RatePolicy::InflowOnly`](crate::RatePolicy::InflowOnly) solve rules
    /// that out.
    #[error(
        "tank never fills: volume at t = {max_time} is {volume_at_max_time}, \
         short of capacity {capacity}{}",
        non_monotone_note(.monotone, .max_volume_seen)
    )]
    NeverFills {
        capacity: f64,
        max_time: f64,
        volume_at_max_time: f64,
        max_volume_seen: f64,
        monotone: bool,
    },

    #[error("invalid options")]
    InvalidOptions(#[from] OptionsError),

    #[error("solve cancelled: {reason}")]
    Cancelled { reason: CancelReason },

    #[error("invalid bracket")]
    InvalidBracket(#[from] BracketError),

    #[error("no strategy could solve the problem")]
    NoApplicableStrategy,

    #[error("bisection failed")]
    Bisection(#[source] bisection::Error),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn non_monotone_note(monotone: &bool, max_volume_seen: &f64) -> String {
    if *monotone {
        String::new()
    } else {
        format!(
            " (volume is not monotone and peaked at {max_volume_seen} among the sampled \
             times; a crossing between samples may have been missed)"
        )
    }
}

/// The category of a [`FillError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    InvalidExpression,
    Integration,
    NeverFills,
    InvalidOptions,
    Cancelled,
    Solver,
}

impl FillError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidExpression(_) => ErrorKind::InvalidExpression,
            Self::Integration(_) => ErrorKind::Integration,
            Self::NeverFills { .. } => ErrorKind::NeverFills,
            Self::InvalidOptions(_) => ErrorKind::InvalidOptions,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::InvalidBracket(_) | Self::NoApplicableStrategy | Self::Bisection(_) => {
                ErrorKind::Solver
            }
        }
    }
}

impl From<bisection::Error> for FillError {
    /// Unwraps integration failures raised inside the volume model.
    fn from(err: bisection::Error) -> Self {
        match err {
            bisection::Error::Model(source) => match source.downcast::<IntegrationError>() {
                Ok(integration) => Self::Integration(*integration),
                Err(other) => Self::Bisection(bisection::Error::Model(other)),
            },
            other => Self::Bisection(other),
        }
    }
}

/// Returns the chain of error messages, outermost first.
///
/// Useful at the presentation boundary, where `Display` alone hides the
/// underlying cause.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages
}
