//! LaTeX rendition of an [`Expr`] for display (`function_latex` in responses).
//!
//! Output is meant for a math renderer only and is never parsed back. Parentheses
//! are emitted only where precedence requires them; a numeric coefficient in front
//! of `x`, a function or a group is written by juxtaposition (`4x`, `3\sin\left(x\right)`).
use crate::symbolic::symbolic_engine::{Expr, Func};

/// binding strength used to decide where parentheses are needed
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => 1,
        Expr::Mul(..) => 2,
        Expr::Neg(_) => 3,
        Expr::Const(val) if val.is_sign_negative() => 3,
        Expr::Pow(..) => 4,
        Expr::Var | Expr::Const(_) | Expr::Div(..) | Expr::Call(..) => 5,
    }
}

fn format_number(val: f64) -> String {
    if val.fract() == 0.0 && val.abs() < 1e15 {
        format!("{}", val as i64)
    } else {
        format!("{}", val)
    }
}

fn group(inner: String) -> String {
    format!(r"\left({}\right)", inner)
}

fn wrap_below(expr: &Expr, min: u8) -> String {
    let rendered = latex(expr);
    if precedence(expr) < min {
        group(rendered)
    } else {
        rendered
    }
}

/// right operand of `+`/`-`; a leading sign gets its own group
fn additive_operand(rhs: &Expr) -> String {
    let rendered = wrap_below(rhs, 2);
    if rendered.starts_with('-') {
        group(rendered)
    } else {
        rendered
    }
}

/// `true` when `expr` prints starting with a letter, a command or a parenthesis
fn starts_symbolically(expr: &Expr) -> bool {
    match expr {
        Expr::Var | Expr::Call(..) => true,
        Expr::Pow(base, _) => starts_symbolically(base) || precedence(base) < 5,
        Expr::Mul(lhs, _) => starts_symbolically(lhs),
        _ => false,
    }
}

fn latex_call(func: Func, arg: &Expr) -> String {
    let inner = latex(arg);
    match func {
        Func::Sin => format!(r"\sin{}", group(inner)),
        Func::Cos => format!(r"\cos{}", group(inner)),
        Func::Tan => format!(r"\tan{}", group(inner)),
        Func::Log => format!(r"\ln{}", group(inner)),
        Func::Exp => format!("e^{{{}}}", inner),
        Func::Sqrt => format!(r"\sqrt{{{}}}", inner),
        Func::Abs => format!(r"\left|{}\right|", inner),
    }
}

fn latex(expr: &Expr) -> String {
    match expr {
        Expr::Var => "x".to_string(),
        Expr::Const(val) => format_number(*val),
        Expr::Add(lhs, rhs) => format!("{} + {}", latex(lhs), additive_operand(rhs)),
        Expr::Sub(lhs, rhs) => format!("{} - {}", latex(lhs), additive_operand(rhs)),
        Expr::Mul(lhs, rhs) => {
            let left = wrap_below(lhs, 2);
            let right = wrap_below(rhs, 4);
            let juxtapose = matches!(**lhs, Expr::Const(val) if !val.is_sign_negative())
                && (starts_symbolically(rhs) || precedence(rhs) < 4);
            if juxtapose {
                format!("{}{}", left, right)
            } else {
                format!(r"{} \cdot {}", left, right)
            }
        }
        Expr::Div(lhs, rhs) => format!(r"\frac{{{}}}{{{}}}", latex(lhs), latex(rhs)),
        Expr::Pow(base, exp) => {
            let base = match **base {
                Expr::Div(..) | Expr::Call(Func::Exp, _) => group(latex(base)),
                _ => wrap_below(base, 5),
            };
            format!("{}^{{{}}}", base, latex(exp))
        }
        Expr::Neg(inner) if precedence(inner) == 3 => format!("-{}", group(latex(inner))),
        Expr::Neg(inner) => format!("-{}", wrap_below(inner, 2)),
        Expr::Call(func, arg) => latex_call(*func, arg),
    }
}

impl Expr {
    /// Convert the expression to LaTeX format.
    pub fn to_latex(&self) -> String {
        latex(self)
    }
}
