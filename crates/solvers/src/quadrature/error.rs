use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur during quadrature.
#[derive(Debug, Error)]
pub enum Error {
    #[error("integration bound is not finite: {value}")]
    NonFiniteBound { value: f64 },

    #[error("integrand evaluation failed at t = {t}")]
    Model {
        t: f64,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("integrand is not finite at t = {t}: {value}")]
    NonFiniteIntegrand { t: f64, value: f64 },

    #[error(
        "quadrature did not converge after {subdivisions} subdivisions \
         (estimate {value}, error {error})"
    )]
    NotConverged {
        value: f64,
        error: f64,
        subdivisions: usize,
    },
}

impl Error {
    pub(crate) fn model<E: StdError + Send + Sync + 'static>(t: f64, err: E) -> Self {
        Self::Model {
            t,
            source: Box::new(err),
        }
    }
}
