use std::fmt;

/// Which strategy produced a fill time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Method {
    /// Capacity was zero; no solve was needed.
    Immediate,
    /// Closed-form root of the integrated rate polynomial.
    Symbolic,
    /// Quadrature with bracket doubling and bisection.
    Numeric,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Symbolic => f.write_str("symbolic"),
            Self::Numeric => f.write_str("numeric"),
        }
    }
}

/// A solved fill time and how much to trust it.
///
/// `time` is unrounded; use [`FillTime::rounded`] or `Display` for the
/// two-decimal presentation form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FillTime {
    /// Estimated first time at which the volume reaches capacity.
    pub time: f64,

    /// Strategy that produced the estimate.
    pub method: Method,

    /// Final bracket around the crossing. Both ends equal `time` for
    /// closed-form results.
    pub bracket: [f64; 2],

    /// Estimated absolute error of the volume at the bracket ends.
    pub volume_error: f64,

    /// Effective uncertainty in `time`.
    ///
    /// Numeric results report at least the solver tolerance and the time
    /// error implied by the volume error; the value is infinite when the
    /// volume is flat across the final bracket. Closed-form results report
    /// machine precision.
    pub precision: f64,

    /// Number of cumulative volume evaluations.
    pub volume_samples: usize,

    /// Number of rate evaluations made by quadrature.
    pub evaluations: usize,

    /// False if the volume was seen to decrease somewhere it was evaluated.
    pub monotone: bool,
}

impl FillTime {
    /// The result for an empty tank: full at `t = 0`.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            time: 0.0,
            method: Method::Immediate,
            bracket: [0.0, 0.0],
            volume_error: 0.0,
            precision: 0.0,
            volume_samples: 0,
            evaluations: 0,
            monotone: true,
        }
    }

    /// Returns the time rounded to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> f64 {
        (self.time * 100.0).round() / 100.0
    }
}

impl fmt::Display for FillTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.time)
    }
}
