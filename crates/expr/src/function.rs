use std::f64::consts;

/// Returns the value of a named constant.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" | "E" => Some(consts::E),
        _ => None,
    }
}

/// Built-in functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unary {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Sign,
}

/// Built-in functions of two arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binary {
    Min,
    Max,
    Atan2,
    Pow,
}

/// A named built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Unary(Unary),
    Binary(Binary),
}

impl Builtin {
    /// Looks up a function by name.
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        let unary = match name {
            "sin" => Unary::Sin,
            "cos" => Unary::Cos,
            "tan" => Unary::Tan,
            "asin" => Unary::Asin,
            "acos" => Unary::Acos,
            "atan" => Unary::Atan,
            "sinh" => Unary::Sinh,
            "cosh" => Unary::Cosh,
            "tanh" => Unary::Tanh,
            "exp" => Unary::Exp,
            "ln" | "log" => Unary::Ln,
            "log10" => Unary::Log10,
            "log2" => Unary::Log2,
            "sqrt" => Unary::Sqrt,
            "abs" => Unary::Abs,
            "floor" => Unary::Floor,
            "ceil" => Unary::Ceil,
            "sign" => Unary::Sign,
            _ => {
                let binary = match name {
                    "min" => Binary::Min,
                    "max" => Binary::Max,
                    "atan2" => Binary::Atan2,
                    "pow" => Binary::Pow,
                    _ => return None,
                };
                return Some(Self::Binary(binary));
            }
        };
        Some(Self::Unary(unary))
    }

    /// Returns the number of arguments the function takes.
    pub(crate) fn arity(self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }

    /// Applies the function, or returns `None` on an argument count mismatch.
    pub(crate) fn call(self, args: &[f64]) -> Option<f64> {
        match (self, args) {
            (Self::Unary(f), &[x]) => Some(f.apply(x)),
            (Self::Binary(f), &[a, b]) => Some(f.apply(a, b)),
            _ => None,
        }
    }
}

impl Unary {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Log10 => x.log10(),
            Self::Log2 => x.log2(),
            Self::Sqrt => x.sqrt(),
            Self::Abs => x.abs(),
            Self::Floor => x.floor(),
            Self::Ceil => x.ceil(),
            Self::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl Binary {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Atan2 => a.atan2(b),
            Self::Pow => a.powf(b),
        }
    }
}
