//! Error types of the calculator.
//!
//! ┌ [`ParseError`]             : formula text does not fit the grammar/whitelist
//! ├ [`DomainError`]            : the formula is undefined at an evaluation point
//! ├ [`RequestValidationError`] : malformed `function`, `x0` or `epsilon`
//! ├ [`SolveError`]             : terminal failure of the Newton-Raphson run
//! ├ [`ConfigError`]            : bad task file
//! └ [`CalcError`]              : everything a request can fail with, plus status code
//!
//! Positions carried by [`ParseError`] are 0-based character offsets; messages
//! print them 1-based.
use thiserror::Error;

/// plain notation for moderate magnitudes, scientific otherwise
fn number(val: &f64) -> String {
    let abs = val.abs();
    if *val == 0.0 || (1e-4..1e15).contains(&abs) {
        format!("{}", val)
    } else {
        format!("{:e}", val)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("expression too long: {len} characters (limit {limit})")]
    TooLong { len: usize, limit: usize },

    #[error("expression nested too deeply at position {} (limit {limit})", .pos + 1)]
    TooDeep { pos: usize, limit: usize },

    #[error("unexpected character '{ch}' at position {}", .pos + 1)]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{text}' at position {}", .pos + 1)]
    InvalidNumber { text: String, pos: usize },

    #[error(
        "unknown identifier '{name}' at position {}: only x and the functions sin, cos, tan, exp, log, sqrt, abs are allowed",
        .pos + 1
    )]
    UnknownIdentifier { name: String, pos: usize },

    #[error("function '{name}' at position {} must be followed by '('", .pos + 1)]
    MissingCallParen { name: String, pos: usize },

    #[error("unexpected token '{token}' at position {}", .pos + 1)]
    UnexpectedToken { token: String, pos: usize },

    #[error("unexpected end of expression at position {}", .pos + 1)]
    UnexpectedEnd { pos: usize },

    #[error("missing ')' for '(' at position {}", .pos + 1)]
    UnclosedParen { pos: usize },
}

/// Reasons an expression has no real value at a point.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("logarithm of non-positive value {}", number(.arg))]
    LogOfNonPositive { arg: f64 },

    #[error("square root of negative value {}", number(.arg))]
    SqrtOfNegative { arg: f64 },

    #[error("non-integer power {} of negative base {}", number(.exponent), number(.base))]
    FractionalPowerOfNegative { base: f64, exponent: f64 },

    #[error("{operation} is not finite")]
    NonFinite { operation: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    #[error("function must not be empty")]
    MissingFunction,

    #[error("x0 must be a real number, got '{value}'")]
    InvalidX0 { value: String },

    #[error("x0 must be finite, got {}", number(.value))]
    NonFiniteX0 { value: f64 },

    #[error("epsilon must be a real number, got '{value}'")]
    InvalidEpsilon { value: String },

    #[error("epsilon must be finite and greater than 0, got {}", number(.value))]
    NonPositiveEpsilon { value: f64 },
}

/// Terminal failures of a Newton-Raphson run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("domain error at iteration {iteration}, x = {}: {source}", number(.x))]
    DomainError {
        iteration: usize,
        x: f64,
        #[source]
        source: DomainError,
    },

    #[error(
        "derivative vanished at iteration {iteration}, x = {} (f'(x) = {})",
        number(.x),
        number(.derivative)
    )]
    DerivativeVanished {
        iteration: usize,
        x: f64,
        derivative: f64,
    },

    #[error(
        "no convergence after {iterations} iterations (last x = {}, last error = {})",
        number(.last_x),
        number(.last_error)
    )]
    MaxIterationsExceeded {
        iterations: usize,
        last_x: f64,
        last_error: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to read task file: {0}")]
    Io(String),

    #[error("task file syntax error: {0}")]
    Syntax(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown key '{key}' in section '{section}'")]
    UnknownKey { section: String, key: String },

    #[error("key '{key}' expects {expected}, got '{got}'")]
    WrongType {
        key: String,
        expected: &'static str,
        got: String,
    },

    #[error("invalid value for '{key}': {reason}")]
    OutOfRange { key: String, reason: String },
}

/// Any failure of a single calculation request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid request: {0}")]
    Validation(#[from] RequestValidationError),

    #[error("invalid function: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

impl CalcError {
    /// Status code of the HTTP-equivalent failure response.
    pub fn status_code(&self) -> u16 {
        match self {
            CalcError::Validation(_) | CalcError::Parse(_) => 400,
            CalcError::Solve(_) => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_positions_are_one_based_in_messages() {
        let err = ParseError::UnknownIdentifier {
            name: "y".to_string(),
            pos: 4,
        };
        assert!(err.to_string().contains("'y' at position 5"));
    }

    #[test]
    fn status_codes_split_client_and_computation_failures() {
        let validation: CalcError = RequestValidationError::MissingFunction.into();
        let parse: CalcError = ParseError::Empty.into();
        let solve: CalcError = SolveError::DerivativeVanished {
            iteration: 1,
            x: 0.0,
            derivative: 0.0,
        }
        .into();
        assert_eq!(validation.status_code(), 400);
        assert_eq!(parse.status_code(), 400);
        assert_eq!(solve.status_code(), 422);
    }

    #[test]
    fn solve_error_message_names_iteration_and_point() {
        let err = SolveError::DomainError {
            iteration: 3,
            x: -1.5,
            source: DomainError::SqrtOfNegative { arg: -1.5 },
        };
        let msg = err.to_string();
        assert!(msg.contains("iteration 3"));
        assert!(msg.contains("x = -1.5"));
        assert!(msg.contains("square root of negative value -1.5"));
    }

    #[test]
    fn extreme_points_print_in_scientific_notation() {
        let err = SolveError::MaxIterationsExceeded {
            iterations: 100,
            last_x: -1e308,
            last_error: 2.5e-9,
        };
        let msg = err.to_string();
        assert!(msg.contains("last x = -1e308"), "{}", msg);
        assert!(msg.contains("last error = 2.5e-9"), "{}", msg);
        assert!(msg.len() < 100);
        assert_eq!(
            DomainError::LogOfNonPositive { arg: -3e200 }.to_string(),
            "logarithm of non-positive value -3e200"
        );
        assert_eq!(number(&0.0), "0");
        assert_eq!(number(&f64::INFINITY), "inf");
    }
}
