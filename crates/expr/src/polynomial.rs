use meval::tokenizer::{Operation, Token};

use crate::function::{Builtin, constant};

/// Highest degree [`Polynomial::from_rpn`] will expand to.
const MAX_DEGREE: usize = 32;

/// A polynomial in the time variable, stored lowest power first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Creates a polynomial from coefficients, lowest power first.
    ///
    /// Trailing zero coefficients are dropped.
    #[must_use]
    pub fn new(coeffs: Vec<f64>) -> Self {
        let mut coeffs = coeffs;
        while coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Returns the coefficients, lowest power first. Empty for zero.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Returns the coefficient of `t^power`.
    #[must_use]
    pub fn coefficient(&self, power: usize) -> f64 {
        self.coeffs.get(power).copied().unwrap_or(0.0)
    }

    /// Returns the degree, treating the zero polynomial as degree 0.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Evaluates the polynomial at `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Returns the antiderivative that vanishes at `t = 0`.
    #[must_use]
    pub fn antiderivative(&self) -> Self {
        let mut coeffs = Vec::with_capacity(self.coeffs.len() + 1);
        coeffs.push(0.0);
        for (k, c) in self.coeffs.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            coeffs.push(c / (k + 1) as f64);
        }
        Self::new(coeffs)
    }

    /// Expands an expression in reverse Polish notation into a polynomial in
    /// `variable`, if it is one.
    ///
    /// Sums, products, division by a constant and non-negative integer powers
    /// expand; functions and remainders only when every argument is constant.
    /// Anything else, a degree above [`MAX_DEGREE`], or a non-finite
    /// coefficient gives `None`.
    pub(crate) fn from_rpn(tokens: &[Token], variable: &str) -> Option<Self> {
        let mut stack: Vec<Self> = Vec::new();

        for token in tokens {
            let term = match token {
                Token::Number(c) => Self::constant(*c),
                Token::Var(name) if name == variable => Self::new(vec![0.0, 1.0]),
                Token::Var(name) => Self::constant(constant(name)?),
                Token::Unary(Operation::Minus) => stack.pop()?.scale(-1.0),
                Token::Unary(Operation::Plus) => stack.pop()?,
                Token::Binary(op) => {
                    let rhs = stack.pop()?;
                    let lhs = stack.pop()?;
                    lhs.combine(*op, &rhs)?
                }
                Token::Func(name, Some(count)) => {
                    let args = stack.split_off(stack.len().checked_sub(*count)?);
                    let values = args
                        .iter()
                        .map(Self::as_constant)
                        .collect::<Option<Vec<_>>>()?;
                    Self::constant(Builtin::lookup(name)?.call(&values)?)
                }
                _ => return None,
            };

            if term.degree() > MAX_DEGREE || term.coeffs.iter().any(|c| !c.is_finite()) {
                return None;
            }
            stack.push(term);
        }

        match stack.len() {
            1 => stack.pop(),
            _ => None,
        }
    }

    fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    fn as_constant(&self) -> Option<f64> {
        (self.coeffs.len() <= 1).then(|| self.coefficient(0))
    }

    fn combine(&self, op: Operation, rhs: &Self) -> Option<Self> {
        match op {
            Operation::Plus => Some(self.add(rhs)),
            Operation::Minus => Some(self.add(&rhs.scale(-1.0))),
            Operation::Times => {
                (self.degree() + rhs.degree() <= MAX_DEGREE).then(|| self.mul(rhs))
            }
            Operation::Div => {
                let c = rhs.as_constant()?;
                (c != 0.0).then(|| self.scale(1.0 / c))
            }
            Operation::Rem => Some(Self::constant(self.as_constant()? % rhs.as_constant()?)),
            Operation::Pow => {
                let n = rhs.as_constant()?;
                if let Some(base) = self.as_constant() {
                    return Some(Self::constant(base.powf(n)));
                }
                #[allow(clippy::cast_precision_loss)]
                let in_range = n >= 0.0 && n.fract() == 0.0 && n <= MAX_DEGREE as f64;
                if !in_range {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = n as usize;
                (self.degree() * n <= MAX_DEGREE).then(|| self.pow(n))
            }
        }
    }

    fn scale(&self, k: f64) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * k).collect())
    }

    fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        Self::new(
            (0..len)
                .map(|i| self.coefficient(i) + other.coefficient(i))
                .collect(),
        )
    }

    fn mul(&self, other: &Self) -> Self {
        if self.coeffs.is_empty() || other.coeffs.is_empty() {
            return Self::new(Vec::new());
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(coeffs)
    }

    fn pow(&self, n: usize) -> Self {
        (0..n).fold(Self::constant(1.0), |acc, _| acc.mul(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use meval::Expr;

    fn poly(src: &str) -> Option<Polynomial> {
        let expr: Expr = src.parse().expect("valid expression");
        Polynomial::from_rpn(&expr, "t")
    }

    #[test]
    fn expands_products_and_powers() {
        let p = poly("(t + 1)^2 - 2*t").expect("polynomial");
        assert_eq!(p.coefficients(), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn constants_are_degree_zero() {
        let p = poly("5").expect("polynomial");
        assert_eq!(p.degree(), 0);
        assert_relative_eq!(p.eval(123.0), 5.0);

        let zero = poly("t - t").expect("polynomial");
        assert!(zero.coefficients().is_empty());
        assert_eq!(zero.degree(), 0);
    }

    #[test]
    fn division_by_constant_scales() {
        let p = poly("(10 - t) / 2").expect("polynomial");
        assert_eq!(p.coefficients(), &[5.0, -0.5]);
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let p = poly("-t^2 + 3").expect("polynomial");
        assert_eq!(p.coefficients(), &[3.0, 0.0, -1.0]);
    }

    #[test]
    fn rejects_non_polynomials() {
        assert!(poly("sin(t)").is_none());
        assert!(poly("1 / t").is_none());
        assert!(poly("t / 0").is_none());
        assert!(poly("t^0.5").is_none());
        assert!(poly("t^-1").is_none());
        assert!(poly("2^t").is_none());
        assert!(poly("t^100").is_none());
        assert!(poly("t % 2").is_none());
        assert!(poly("1e308 * t * 1e308").is_none());
    }

    #[test]
    fn functions_of_constants_are_folded() {
        let p = poly("sin(pi / 2) * t + max(2, 3)").expect("polynomial");
        assert_relative_eq!(p.coefficient(0), 3.0);
        assert_relative_eq!(p.coefficient(1), 1.0);
    }

    #[test]
    fn long_sums_expand_without_recursion() {
        let terms = 100_000;
        let source = vec!["t"; terms].join(" + ");
        let p = poly(&source).expect("polynomial");
        assert_eq!(p.degree(), 1);
        assert_relative_eq!(p.coefficient(1), 100_000.0);
    }

    #[test]
    fn antiderivative_vanishes_at_zero() {
        let p = Polynomial::new(vec![10.0, -1.0]);
        let v = p.antiderivative();
        assert_eq!(v.coefficients(), &[0.0, 10.0, -0.5]);
        assert_relative_eq!(v.eval(10.0), 50.0);
        assert_relative_eq!(v.eval(0.0), 0.0);
    }
}
