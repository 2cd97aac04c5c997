//! # Calculation entry points
//!
//! One request is `validate → parse → Newton-Raphson → plot sample → payload`, a pure
//! pipeline over the request and an explicit [`SolverConfig`]:
//!
//! - [`solve_request`] returns the terminal state of the run together with its payload
//! - [`evaluate_request`] returns a payload for every finished run, converged or not
//! - [`calculate`] treats every non-converged run as an error
//! - [`handle_json`] is the HTTP-equivalent: JSON body in, status code and JSON body out
//! - [`calculate_batch`] runs independent requests in parallel
//!
//! # Example
//! ```
//! use RustedNewton::api::{handle_json};
//! use RustedNewton::numerical::config::SolverConfig;
//! let (status, body) = handle_json(r#"{"function": "x^2 - 4x + 4", "x0": "1"}"#, &SolverConfig::default());
//! assert_eq!(status, 200);
//! println!("{}", body);
//! let (status, _) = handle_json(r#"{"function": "x^3", "x0": 0}"#, &SolverConfig::default());
//! assert_eq!(status, 422);
//! ```
/// request body and its validation
pub mod request;
/// response bodies
pub mod payload;

use crate::Utils::logger::elapsed_time;
use crate::error::CalcError;
use crate::numerical::NR::{IterationOutcome, NR};
use crate::numerical::config::SolverConfig;
use crate::numerical::plot_sampler::PlotSample;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
pub use payload::{ErrorResponse, ResultPayload};
use rayon::prelude::*;
pub use request::{CalcRequest, NumberInput};
use serde_json::{Value, json};
use std::time::Instant;

/// Runs the whole pipeline and returns the terminal state together with its payload.
pub fn solve_request(
    request: &CalcRequest,
    config: &SolverConfig,
) -> Result<(IterationOutcome, ResultPayload), CalcError> {
    let begin = Instant::now();
    let valid = request.validate()?;
    let expr = Expr::parse_expression(&valid.function)?;
    debug!("parsed '{}' into {} nodes: {}", valid.function, expr.size(), expr);
    if !expr.contains_variable() {
        warn!("function '{}' does not depend on x", valid.function);
    }
    let tolerance = valid.epsilon.unwrap_or(config.tolerance);
    let outcome = NR::new(&expr, valid.x0)
        .with_config(config)
        .with_tolerance(tolerance)
        .solve();
    let plot = PlotSample::new(&expr, &outcome.estimates(valid.x0), config);
    let payload = ResultPayload::assemble(&expr, &outcome, plot);
    info!(
        "'{}' from x0 = {}: {} after {} iterations",
        valid.function,
        valid.x0,
        outcome.kind(),
        outcome.iterations()
    );
    elapsed_time(begin.elapsed());
    Ok((outcome, payload))
}

/// Payload for any finished run; only validation and parse failures are errors.
pub fn evaluate_request(
    request: &CalcRequest,
    config: &SolverConfig,
) -> Result<ResultPayload, CalcError> {
    solve_request(request, config).map(|(_, payload)| payload)
}

/// Payload of a converged run, or the first failure.
pub fn calculate(request: &CalcRequest, config: &SolverConfig) -> Result<ResultPayload, CalcError> {
    let (outcome, payload) = solve_request(request, config)?;
    into_result(&outcome, payload)
}

/// The payload of a converged run, otherwise the failure the outcome stands for.
pub fn into_result(
    outcome: &IterationOutcome,
    payload: ResultPayload,
) -> Result<ResultPayload, CalcError> {
    match outcome.failure() {
        Some(failure) => Err(failure.into()),
        None => Ok(payload),
    }
}

/// Independent requests in parallel; results keep the order of `requests`.
pub fn calculate_batch(
    requests: &[CalcRequest],
    config: &SolverConfig,
) -> Vec<Result<ResultPayload, CalcError>> {
    info!("batch of {} requests", requests.len());
    requests
        .par_iter()
        .map(|request| calculate(request, config))
        .collect()
}

fn error_body(message: String) -> Value {
    json!(ErrorResponse { error: message })
}

/// Status code and JSON body for the result of one request.
pub fn respond(result: Result<ResultPayload, CalcError>) -> (u16, Value) {
    match result {
        Ok(payload) => match serde_json::to_value(&payload) {
            Ok(body) => (200, body),
            Err(e) => (500, error_body(format!("failed to encode response: {}", e))),
        },
        Err(e) => {
            warn!("request failed: {}", e);
            (e.status_code(), error_body(e.to_string()))
        }
    }
}

/// JSON request body in, status code and JSON response body out.
pub fn handle_json(body: &str, config: &SolverConfig) -> (u16, String) {
    let (status, value) = match serde_json::from_str::<CalcRequest>(body) {
        Ok(request) => respond(calculate(&request, config)),
        Err(e) => (400, error_body(format!("malformed request: {}", e))),
    };
    (status, value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequestValidationError, SolveError};
    use crate::numerical::NR::OutcomeKind;
    use approx::assert_relative_eq;

    fn config() -> SolverConfig {
        SolverConfig::default()
    }

    #[test]
    fn test_calculate_converges() {
        let request = CalcRequest::new("x^2 - 4x + 4", "1", None);
        let payload = calculate(&request, &config()).unwrap();
        assert_relative_eq!(payload.solution.unwrap(), 2.0, epsilon = 1e-5);
        assert!(payload.steps.last().unwrap().error < 1e-6);
        assert_eq!(payload.plot_data.x_vals.len(), 200);
    }

    #[test]
    fn test_request_epsilon_overrides_config() {
        let loose = CalcRequest::new("x^2 - 2", 10.0, Some("0.1".into()));
        let tight = CalcRequest::new("x^2 - 2", 10.0, None);
        let loose = calculate(&loose, &config()).unwrap();
        let tight = calculate(&tight, &config()).unwrap();
        assert!(loose.iterations < tight.iterations);
    }

    #[test]
    fn test_evaluate_request_keeps_failed_runs() {
        let request = CalcRequest::new("x^3 - 2x + 2", 0.0, None);
        let payload = evaluate_request(&request, &config()).unwrap();
        assert_eq!(payload.outcome, OutcomeKind::MaxIterationsExceeded);
        assert_eq!(payload.iterations, 100);
        assert_eq!(payload.solution, None);

        match calculate(&request, &config()) {
            Err(CalcError::Solve(SolveError::MaxIterationsExceeded { iterations, .. })) => {
                assert_eq!(iterations, 100)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_validation_runs_before_parsing() {
        // the function is not even valid, epsilon is reported first
        let request = CalcRequest::new("x +* 1", 1.0, Some((-1.0).into()));
        assert_eq!(
            evaluate_request(&request, &config()),
            Err(CalcError::Validation(RequestValidationError::NonPositiveEpsilon {
                value: -1.0
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        let request = CalcRequest::new("x + y", 1.0, None);
        assert!(matches!(
            calculate(&request, &config()),
            Err(CalcError::Parse(_))
        ));
    }

    #[test]
    fn test_handle_json_statuses() {
        let cfg = config();
        let (status, body) = handle_json(r#"{"function": "x^2 - 2", "x0": 1}"#, &cfg);
        assert_eq!(status, 200);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["outcome"], "converged");

        for (request, expected) in [
            ("not json", 400),
            (r#"{"function": "x^2", "x0": "abc"}"#, 400),
            (r#"{"function": "x^2", "x0": 1, "epsilon": -1}"#, 400),
            (r#"{"function": "x^2", "x0": 1, "epsilon": "abc"}"#, 400),
            (r#"{"function": "import os", "x0": 1}"#, 400),
            (r#"{"function": "x^3", "x0": 0}"#, 422),
            (r#"{"function": "sqrt(x)", "x0": -1}"#, 422),
            (r#"{"function": "x^3 - 2x + 2", "x0": 0}"#, 422),
            (r#"{"function": "1e-9*x - 1e299", "x0": -1e308}"#, 422),
        ] {
            let (status, body) = handle_json(request, &cfg);
            assert_eq!(status, expected, "{}", request);
            let json: Value = serde_json::from_str(&body).unwrap();
            assert!(json["error"].is_string(), "{}", body);
        }
    }

    #[test]
    fn test_error_messages_name_the_cause() {
        let (_, body) = handle_json(r#"{"function": "x^3", "x0": 0}"#, &config());
        assert!(body.contains("derivative vanished at iteration 1"));
        let (_, body) = handle_json(r#"{"function": "2x + y", "x0": 0}"#, &config());
        assert!(body.contains("'y' at position 6"));
        let (_, body) = handle_json(r#"{"function": "1e-9*x - 1e299", "x0": -1e308}"#, &config());
        assert!(body.contains("x = -1e308: newton step is not finite"), "{}", body);
    }

    #[test]
    fn test_batch_keeps_order() {
        let requests: Vec<CalcRequest> = (1..=20)
            .map(|k| CalcRequest::new(&format!("x^2 - {}", k), 1.0, None))
            .chain(std::iter::once(CalcRequest::new("x^3", 0.0, None)))
            .collect();
        let results = calculate_batch(&requests, &config());
        assert_eq!(results.len(), 21);
        for (k, result) in (1..=20).zip(&results) {
            let solution = result.as_ref().unwrap().solution.unwrap();
            assert_relative_eq!(solution, (k as f64).sqrt(), epsilon = 1e-6);
        }
        assert!(results[20].is_err());
    }
}
