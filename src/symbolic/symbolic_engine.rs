//! # Symbolic Engine Module
//!
//! Expression tree for formulas of one real variable `x`.
//!
//! ## Purpose
//!
//! A formula typed by an anonymous caller is turned into an [`Expr`] by the parser
//! (`parse_expr`) and then only ever *interpreted* by the evaluator
//! (`symbolic_eval`). Nothing in the tree can name anything outside a fixed
//! whitelist: numeric constants, the variable `x`, the five arithmetic operators,
//! negation, and the functions listed in [`Func`].
//!
//! ## Main Structures
//!
//! - [`Expr`] - recursive tree, one variant per node kind
//! - [`Func`] - whitelisted unary functions; the name table is derived by `strum`,
//!   so the parser, the canonical printer and the LaTeX printer share one spelling
//!
//! ## Display
//!
//! `Display` prints a canonical fully parenthesized form, e.g. `((x ^ 2) - (4 * x))`,
//! which the parser accepts again and maps back to the same tree.

use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Whitelisted unary functions.
///
/// `FromStr` is the lookup table used by the parser; `ln` is accepted as an alias
/// of `log` (natural logarithm).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    #[strum(to_string = "log", serialize = "ln")]
    Log,
    Sqrt,
    Abs,
}

/// Expression tree over the single variable `x`.
///
/// # Examples
/// ```rust, ignore
/// let expr = Expr::x().pow(Expr::Const(2.0)) - Expr::Const(4.0);
/// assert_eq!(expr.to_string(), "((x ^ 2) - 4)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The free variable `x`
    Var,
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Unary minus
    Neg(Box<Expr>),
    /// Whitelisted function applied to an argument
    Call(Func, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var => write!(f, "x"),
            // parser never produces negative constants, print them as a negation
            Expr::Const(val) if val.is_sign_negative() => write!(f, "(-{})", -val),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Neg(expr) => write!(f, "(-{})", expr),
            Expr::Call(func, arg) => write!(f, "{}({})", func, arg),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Neg(self.boxed())
    }
}

impl Expr {
    /// The variable `x`.
    pub fn x() -> Expr {
        Expr::Var
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Applies a whitelisted function to self.
    pub fn call(self, func: Func) -> Expr {
        Expr::Call(func, self.boxed())
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Var | Expr::Const(_) => 1,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => 1 + lhs.size() + rhs.size(),
            Expr::Neg(expr) | Expr::Call(_, expr) => 1 + expr.size(),
        }
    }

    /// check if the expression depends on `x` at all
    pub fn contains_variable(&self) -> bool {
        match self {
            Expr::Var => true,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.contains_variable() || rhs.contains_variable(),
            Expr::Neg(expr) | Expr::Call(_, expr) => expr.contains_variable(),
        }
    }
}
