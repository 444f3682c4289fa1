//! Arithmetic operations helpers
//!
//! This module contains the operation kind enums backends dispatch on. The
//! actual operations are defined in the operation traits.

/// Binary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b
    Mul,
    /// Division: a / b
    Div,
    /// Power: a^b
    Pow,
    /// Two-argument arctangent: atan2(a, b)
    Atan2,
}

impl BinaryOp {
    /// Apply the operation to a pair of scalars
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Atan2 => a.atan2(b),
        }
    }
}

/// Unary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation: -a
    Neg,
    /// Exponential: e^a
    Exp,
    /// Natural log: ln(a)
    Log,
    /// Reciprocal: 1/a
    Recip,
    /// Square: a^2
    Square,
}

impl UnaryOp {
    /// Apply the operation to a scalar
    #[inline]
    pub fn apply(self, a: f64) -> f64 {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Exp => a.exp(),
            UnaryOp::Log => a.ln(),
            UnaryOp::Recip => a.recip(),
            UnaryOp::Square => a * a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_apply() {
        assert_eq!(BinaryOp::Sub.apply(5.0, 3.0), 2.0);
        assert_eq!(BinaryOp::Pow.apply(2.0, 3.0), 8.0);
        assert_eq!(BinaryOp::Atan2.apply(1.0, 1.0), std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn test_recip_of_infinity_is_zero() {
        assert_eq!(UnaryOp::Recip.apply(f64::INFINITY), 0.0);
        assert_eq!(UnaryOp::Recip.apply(0.0), f64::INFINITY);
    }
}
