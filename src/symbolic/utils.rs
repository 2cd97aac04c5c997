// grids and finite differences shared by the solver and the plot sampler
use crate::error::DomainError;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_eval::EvaluationResult;

/// Relative step of the centered difference, scaled by `max(1, |x|)`.
pub const DERIVATIVE_STEP: f64 = 1e-6;

/// `num_values` evenly spaced points; the first is `start` and the last is exactly `end`.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values as f64 - 1.0);
            let mut values: Vec<f64> = (0..num_values - 1)
                .map(|i| start + (i as f64 * step))
                .collect();
            values.push(end);
            values
        }
    }
}

/*
    f'(x) ≈ (f(x + h) - f(x - h)) / (2h),   h = step * max(1, |x|)
*/
/// Centered finite-difference derivative of `expr` at `x` with relative step `step`.
///
/// A domain error at either stencil point is the result; so is a non-finite quotient.
pub fn numerical_derivative(expr: &Expr, x: f64, step: f64) -> EvaluationResult {
    let h = step * x.abs().max(1.0);
    let f_x_plus_h = expr.evaluate(x + h)?;
    let f_x_minus_h = expr.evaluate(x - h)?;
    let derivative = (f_x_plus_h - f_x_minus_h) / (2.0 * h);
    if derivative.is_finite() {
        Ok(derivative)
    } else {
        Err(DomainError::NonFinite {
            operation: "derivative",
        })
    }
}

impl Expr {
    /// Derivative at `x` with the default step [`DERIVATIVE_STEP`].
    pub fn derivative(&self, x: f64) -> EvaluationResult {
        numerical_derivative(self, x, DERIVATIVE_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-1.0, 1.0, 5);
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        let xs = linspace(0.1, 0.7, 200);
        assert_eq!(xs.len(), 200);
        assert_eq!(xs[0], 0.1);
        assert_eq!(xs[199], 0.7);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }

    #[test]
    fn test_derivative_of_polynomial() {
        let f = Expr::parse_expression("x^2 - 4*x + 4").unwrap();
        assert_relative_eq!(f.derivative(1.0).unwrap(), -2.0, epsilon = 1e-6);
        assert_relative_eq!(f.derivative(5.0).unwrap(), 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_derivative_scales_step_with_magnitude() {
        let f = Expr::parse_expression("x^2").unwrap();
        // with an absolute 1e-6 step the difference would drown in rounding at 1e8
        assert_relative_eq!(f.derivative(1e8).unwrap(), 2e8, max_relative = 1e-6);
    }

    #[test]
    fn test_derivative_of_transcendental() {
        let f = Expr::parse_expression("sin(x) + exp(x)").unwrap();
        let x = 0.7f64;
        assert_relative_eq!(f.derivative(x).unwrap(), x.cos() + x.exp(), epsilon = 1e-8);
    }

    #[test]
    fn test_cubic_slope_vanishes_at_zero() {
        let f = Expr::parse_expression("x^3").unwrap();
        assert!(f.derivative(0.0).unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_domain_error_at_stencil_point() {
        let f = Expr::parse_expression("sqrt(x)").unwrap();
        // x - h is negative
        assert_eq!(
            f.derivative(0.0),
            Err(DomainError::SqrtOfNegative { arg: -1e-6 })
        );
        let g = Expr::parse_expression("log(x)").unwrap();
        assert!(g.derivative(-3.0).is_err());
    }
}
