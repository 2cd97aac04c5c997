#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedNewton::symbolic::symbolic_engine::Expr;
/// let input = "x^2 + sin(x)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert!(Expr::parse_expression("y + 1").is_err());
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree itself:
/// 1) whitelisted functions
/// 2) operator overloads to build trees by hand
/// 3) canonical fully parenthesized printing
///# Example#
/// ```
/// use RustedNewton::symbolic::symbolic_engine::{Expr, Func};
/// let expr = Expr::x().pow(Expr::Const(2.0)) + Expr::x().call(Func::Sin);
/// assert_eq!(expr.to_string(), "((x ^ 2) + sin(x))");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// ________________________________________________________________________________________________________________________________
/// # Evaluation
/// turns an expression and a value of x into a finite number or a typed domain error
///# Example#
/// ```
/// use RustedNewton::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("sqrt(x)").unwrap();
/// assert_eq!(f.evaluate(4.0), Ok(2.0));
/// assert!(f.evaluate(-1.0).is_err());
/// ```
pub mod symbolic_eval;
/// LaTeX form of an expression for display
pub mod symbolic_latex;
/// linspace and centered finite differences
pub mod utils;
