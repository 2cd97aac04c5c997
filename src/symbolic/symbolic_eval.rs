//! # Expression evaluation
//!
//! Recursive interpreter over [`Expr`]. Every node either yields a finite `f64`
//! or stops the walk with a [`DomainError`]; no NaN or infinity ever leaves
//! [`Expr::evaluate`].
//!
//! Rules on top of IEEE arithmetic:
//! - `a / 0` (including `0 / 0`) is [`DomainError::DivisionByZero`]
//! - `log(a)` needs `a > 0`, `sqrt(a)` needs `a >= 0`
//! - `a ^ b` with `a < 0` needs an integer `b`
//! - any non-finite intermediate (overflow of `exp`, `x^1000`, ...) is
//!   [`DomainError::NonFinite`]
use crate::error::DomainError;
use crate::symbolic::symbolic_engine::{Expr, Func};

/// Either a finite value or the reason the expression is undefined.
pub type EvaluationResult = Result<f64, DomainError>;

fn finite(val: f64, operation: &'static str) -> EvaluationResult {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(DomainError::NonFinite { operation })
    }
}

fn power(base: f64, exponent: f64) -> EvaluationResult {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(DomainError::FractionalPowerOfNegative { base, exponent });
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(DomainError::DivisionByZero);
    }
    finite(base.powf(exponent), "power")
}

fn apply(func: Func, arg: f64) -> EvaluationResult {
    match func {
        Func::Sin => finite(arg.sin(), "sin"),
        Func::Cos => finite(arg.cos(), "cos"),
        Func::Tan => finite(arg.tan(), "tan"),
        Func::Exp => finite(arg.exp(), "exp"),
        Func::Log if arg <= 0.0 => Err(DomainError::LogOfNonPositive { arg }),
        Func::Log => finite(arg.ln(), "log"),
        Func::Sqrt if arg < 0.0 => Err(DomainError::SqrtOfNegative { arg }),
        Func::Sqrt => finite(arg.sqrt(), "sqrt"),
        Func::Abs => Ok(arg.abs()),
    }
}

impl Expr {
    /// Evaluates the expression at `x`.
    ///
    /// Pure function of `self` and `x`; safe to call from many threads at once.
    pub fn evaluate(&self, x: f64) -> EvaluationResult {
        match self {
            Expr::Var => finite(x, "x"),
            Expr::Const(val) => finite(*val, "constant"),
            Expr::Add(lhs, rhs) => finite(lhs.evaluate(x)? + rhs.evaluate(x)?, "sum"),
            Expr::Sub(lhs, rhs) => finite(lhs.evaluate(x)? - rhs.evaluate(x)?, "difference"),
            Expr::Mul(lhs, rhs) => finite(lhs.evaluate(x)? * rhs.evaluate(x)?, "product"),
            Expr::Div(lhs, rhs) => {
                let num = lhs.evaluate(x)?;
                let den = rhs.evaluate(x)?;
                if den == 0.0 {
                    return Err(DomainError::DivisionByZero);
                }
                finite(num / den, "quotient")
            }
            Expr::Pow(base, exp) => power(base.evaluate(x)?, exp.evaluate(x)?),
            Expr::Neg(expr) => Ok(-expr.evaluate(x)?),
            Expr::Call(func, arg) => apply(*func, arg.evaluate(x)?),
        }
    }
}
