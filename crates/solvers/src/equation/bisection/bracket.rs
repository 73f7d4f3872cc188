use thiserror::Error;

/// Errors that can occur when creating a [`Bracket`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BracketError {
    /// One or both endpoints are non-finite.
    #[error("non-finite endpoint(s)")]
    NonFinite,

    /// Endpoints are equal, giving zero width.
    #[error("zero width")]
    ZeroWidth,

    /// One or both endpoint residuals are non-finite.
    #[error("non-finite residual(s)")]
    NonFiniteResidual,

    /// Residual signs do not bracket a root.
    #[error("no sign change")]
    NoSignChange,
}

/// Current bracket bounds and the residuals evaluated at them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    left: f64,
    right: f64,
    left_residual: f64,
    right_residual: f64,
}

impl Bracket {
    /// Creates a validated bracket from endpoints and their residuals.
    ///
    /// Endpoints may be given in either order; the residuals follow them.
    ///
    /// # Errors
    ///
    /// Returns a [`BracketError`] if an endpoint or residual is non-finite,
    /// the endpoints are equal, or the residual signs do not differ.
    pub fn new(bounds: [f64; 2], residuals: [f64; 2]) -> Result<Self, BracketError> {
        let [a, b] = bounds;
        let [ra, rb] = residuals;

        if !a.is_finite() || !b.is_finite() {
            return Err(BracketError::NonFinite);
        }

        #[allow(clippy::float_cmp)]
        if a == b {
            return Err(BracketError::ZeroWidth);
        }

        if !ra.is_finite() || !rb.is_finite() {
            return Err(BracketError::NonFiniteResidual);
        }

        if Sign::of(ra) == Sign::of(rb) {
            return Err(BracketError::NoSignChange);
        }

        let (left, right, left_residual, right_residual) = if a < b {
            (a, b, ra, rb)
        } else {
            (b, a, rb, ra)
        };

        Ok(Self {
            left,
            right,
            left_residual,
            right_residual,
        })
    }

    /// Returns the bracket bounds as an array.
    #[must_use]
    pub fn bounds(&self) -> [f64; 2] {
        [self.left, self.right]
    }

    /// Returns the residuals at the bracket bounds.
    #[must_use]
    pub fn residuals(&self) -> [f64; 2] {
        [self.left_residual, self.right_residual]
    }

    /// Returns the midpoint of the bracket.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.left + self.right)
    }

    /// Returns the bracket width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Returns true if the bracket width satisfies the x tolerances.
    #[must_use]
    pub fn is_x_converged(&self, x_abs_tol: f64, x_rel_tol: f64) -> bool {
        self.width() <= x_abs_tol + x_rel_tol * self.midpoint().abs()
    }

    /// Shrinks the bracket using a new interior point and its residual.
    pub(super) fn shrink(&mut self, x: f64, residual: f64) {
        if Sign::of(self.left_residual) == Sign::of(residual) {
            self.left = x;
            self.left_residual = residual;
        } else {
            self.right = x;
            self.right_residual = residual;
        }
    }
}

/// The sign of a residual for bracket logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Residual is positive (or zero).
    Positive,
    /// Residual is negative.
    Negative,
}

impl Sign {
    /// Returns the sign of a residual value.
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn reorders_bounds_with_residuals() {
        let bracket = Bracket::new([3.0, 1.0], [2.0, -1.0]).expect("valid bracket");
        assert_eq!(bracket.bounds(), [1.0, 3.0]);
        assert_eq!(bracket.residuals(), [-1.0, 2.0]);
    }

    #[test]
    fn rejects_non_finite() {
        assert_eq!(
            Bracket::new([f64::NAN, 1.0], [-1.0, 1.0]),
            Err(BracketError::NonFinite)
        );
        assert_eq!(
            Bracket::new([0.0, 1.0], [-1.0, f64::INFINITY]),
            Err(BracketError::NonFiniteResidual)
        );
    }

    #[test]
    fn rejects_zero_width() {
        assert_eq!(
            Bracket::new([2.0, 2.0], [-1.0, 1.0]),
            Err(BracketError::ZeroWidth)
        );
    }

    #[test]
    fn rejects_no_sign_change() {
        assert_eq!(
            Bracket::new([0.0, 1.0], [0.5, 0.0]),
            Err(BracketError::NoSignChange)
        );
    }

    #[test]
    fn shrink_shifts_bounds() {
        let mut bracket = Bracket::new([0.0, 2.0], [-1.0, 1.0]).expect("valid bracket");

        bracket.shrink(1.0, -0.25);
        assert_eq!(bracket.bounds(), [1.0, 2.0]);

        bracket.shrink(1.5, 0.5);
        assert_eq!(bracket.bounds(), [1.0, 1.5]);
        assert_relative_eq!(bracket.width(), 0.5);
        assert_relative_eq!(bracket.midpoint(), 1.25);
    }

    #[test]
    fn convergence_uses_both_tolerances() {
        let bracket = Bracket::new([10.0, 10.5], [-1.0, 1.0]).expect("valid bracket");
        assert!(!bracket.is_x_converged(0.1, 0.0));
        assert!(bracket.is_x_converged(0.5, 0.0));
        assert!(bracket.is_x_converged(0.0, 0.05));
    }
}
