///  Example#1
/// ```
///  use RustedNewton::numerical::NR::NR;
///  use RustedNewton::symbolic::symbolic_engine::Expr;
///  let f = Expr::parse_expression("x^2 - 4x + 4").unwrap();
///  let outcome = NR::new(&f, 1.0).solve();
///  let solution = outcome.solution().unwrap();
///  assert!((solution - 2.0).abs() < 1e-3);
///  println!("result = {:?} \n", solution);
///  ```
/// Example#2
///  ```
///    // step by step: every call to advance() is one transition of the state machine
///     use RustedNewton::numerical::NR::{NR, SolverState};
///     use RustedNewton::numerical::config::SolverConfig;
///     use RustedNewton::symbolic::symbolic_engine::Expr;
///     let f = Expr::parse_expression("x^3").unwrap();
///     let mut solver = NR::new(&f, 0.0).with_config(&SolverConfig::default());
///     assert_eq!(solver.state(), &SolverState::Init);
///     solver.advance();
///     assert_eq!(solver.state(), &SolverState::Iterating { x_n: 0.0 });
///     solver.advance();
///     assert!(matches!(solver.state(), SolverState::Done(_)));
///  ```
use crate::error::{DomainError, SolveError};
use crate::numerical::config::{
    DEFAULT_TOLERANCE, DERIVATIVE_STEP, MAX_ITERATIONS, SolverConfig, VANISHING_THRESHOLD,
};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::numerical_derivative;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use strum_macros::{AsRefStr, Display, EnumIter};
use tabled::{Table, Tabled, builder::Builder, settings::Style};

/// One Newton-Raphson iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Step {
    /// 1-based
    pub iteration: usize,
    pub x_n: f64,
    #[tabled(rename = "f(x_n)")]
    pub f_x: f64,
    #[tabled(rename = "f'(x_n)")]
    pub df_x: f64,
    #[tabled(rename = "x_n+1")]
    pub next_x: f64,
    #[tabled(rename = "|x_n+1 - x_n|")]
    pub error: f64,
}

/// Tag of a terminal state, as it appears in the response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeKind {
    Converged,
    MaxIterationsExceeded,
    DerivativeVanished,
    DomainError,
}

/// Terminal classification of a run. Every variant keeps the steps recorded so far.
#[derive(Debug, Clone, PartialEq)]
pub enum IterationOutcome {
    Converged {
        solution: f64,
        steps: Vec<Step>,
    },
    MaxIterationsExceeded {
        steps: Vec<Step>,
    },
    /// `iteration` is the one that could not be completed
    DerivativeVanished {
        iteration: usize,
        x: f64,
        derivative: f64,
        steps: Vec<Step>,
    },
    DomainError {
        iteration: usize,
        x: f64,
        error: DomainError,
        steps: Vec<Step>,
    },
}

impl IterationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            IterationOutcome::Converged { .. } => OutcomeKind::Converged,
            IterationOutcome::MaxIterationsExceeded { .. } => OutcomeKind::MaxIterationsExceeded,
            IterationOutcome::DerivativeVanished { .. } => OutcomeKind::DerivativeVanished,
            IterationOutcome::DomainError { .. } => OutcomeKind::DomainError,
        }
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            IterationOutcome::Converged { steps, .. }
            | IterationOutcome::MaxIterationsExceeded { steps }
            | IterationOutcome::DerivativeVanished { steps, .. }
            | IterationOutcome::DomainError { steps, .. } => steps,
        }
    }

    pub fn iterations(&self) -> usize {
        self.steps().len()
    }

    /// `Some` only for a converged run
    pub fn solution(&self) -> Option<f64> {
        match self {
            IterationOutcome::Converged { solution, .. } => Some(*solution),
            _ => None,
        }
    }

    /// `x0` followed by every `x_{n+1}` of the trace.
    pub fn estimates(&self, x0: f64) -> Vec<f64> {
        std::iter::once(x0)
            .chain(self.steps().iter().map(|step| step.next_x))
            .collect()
    }

    /// The failure a non-converged run stands for.
    pub fn failure(&self) -> Option<SolveError> {
        match self {
            IterationOutcome::Converged { .. } => None,
            IterationOutcome::MaxIterationsExceeded { steps } => {
                let (last_x, last_error) = steps
                    .last()
                    .map(|step| (step.next_x, step.error))
                    .unwrap_or((f64::NAN, f64::NAN));
                Some(SolveError::MaxIterationsExceeded {
                    iterations: steps.len(),
                    last_x,
                    last_error,
                })
            }
            IterationOutcome::DerivativeVanished {
                iteration,
                x,
                derivative,
                ..
            } => Some(SolveError::DerivativeVanished {
                iteration: *iteration,
                x: *x,
                derivative: *derivative,
            }),
            IterationOutcome::DomainError {
                iteration, x, error, ..
            } => Some(SolveError::DomainError {
                iteration: *iteration,
                x: *x,
                source: *error,
            }),
        }
    }
}

/// `Init → Iterating → Done(outcome)`; `Done` is final.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverState {
    Init,
    Iterating { x_n: f64 },
    Done(IterationOutcome),
}

pub struct NR<'a> {
    expr: &'a Expr,
    pub initial_guess: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub derivative_step: f64,
    pub vanishing_threshold: f64,

    state: SolverState,
    steps: Vec<Step>,
    max_error: f64, // error of the previous iteration
}

impl<'a> NR<'a> {
    pub fn new(expr: &'a Expr, initial_guess: f64) -> NR<'a> {
        NR {
            expr,
            initial_guess,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: MAX_ITERATIONS,
            derivative_step: DERIVATIVE_STEP,
            vanishing_threshold: VANISHING_THRESHOLD,
            state: SolverState::Init,
            steps: Vec::new(),
            max_error: 0.0,
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn with_config(mut self, config: &SolverConfig) -> Self {
        self.tolerance = config.tolerance;
        self.max_iterations = config.max_iterations;
        self.derivative_step = config.derivative_step;
        self.vanishing_threshold = config.vanishing_threshold;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn state(&self) -> &SolverState {
        &self.state
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    fn finish(&mut self, outcome: impl FnOnce(Vec<Step>) -> IterationOutcome) -> SolverState {
        SolverState::Done(outcome(std::mem::take(&mut self.steps)))
    }

    fn domain_error(&mut self, iteration: usize, x: f64, error: DomainError) -> SolverState {
        warn!("domain error at iteration {}, x = {}: {}", iteration, x, error);
        self.finish(|steps| IterationOutcome::DomainError {
            iteration,
            x,
            error,
            steps,
        })
    }

    /// realize iteration of Newton-Raphson starting from x_n
    fn iteration(&mut self, x_n: f64) -> SolverState {
        let iteration = self.steps.len() + 1;
        if iteration > self.max_iterations {
            error!("Maximum number of iterations reached. No solution found.");
            return self.finish(|steps| IterationOutcome::MaxIterationsExceeded { steps });
        }
        let f_x = match self.expr.evaluate(x_n) {
            Ok(value) => value,
            Err(e) => return self.domain_error(iteration, x_n, e),
        };
        let df_x = match numerical_derivative(self.expr, x_n, self.derivative_step) {
            Ok(value) => value,
            Err(e) => return self.domain_error(iteration, x_n, e),
        };
        if df_x.abs() < self.vanishing_threshold {
            warn!(
                "derivative vanished at iteration {}, x = {}, f'(x) = {}",
                iteration, x_n, df_x
            );
            return self.finish(|steps| IterationOutcome::DerivativeVanished {
                iteration,
                x: x_n,
                derivative: df_x,
                steps,
            });
        }
        let next_x = x_n - f_x / df_x;
        if !next_x.is_finite() {
            return self.domain_error(
                iteration,
                x_n,
                DomainError::NonFinite {
                    operation: "newton step",
                },
            );
        }
        let error = (next_x - x_n).abs();
        if error > self.max_error && iteration > 1 {
            warn!("Error is increasing");
        }
        self.max_error = error;
        info!("iteration = {}, error = {}", iteration, error);
        self.steps.push(Step {
            iteration,
            x_n,
            f_x,
            df_x,
            next_x,
            error,
        });
        if error < self.tolerance {
            info!("converged to {} in {} iterations", next_x, iteration);
            return self.finish(|steps| IterationOutcome::Converged {
                solution: next_x,
                steps,
            });
        }
        SolverState::Iterating { x_n: next_x }
    }

    /// One transition of the state machine. Does nothing once the run is done.
    pub fn advance(&mut self) -> &SolverState {
        let state = std::mem::replace(&mut self.state, SolverState::Init);
        self.state = match state {
            SolverState::Init => {
                debug!(
                    "starting from x0 = {} with tolerance {}",
                    self.initial_guess, self.tolerance
                );
                SolverState::Iterating {
                    x_n: self.initial_guess,
                }
            }
            SolverState::Iterating { x_n } => self.iteration(x_n),
            done @ SolverState::Done(_) => done,
        };
        &self.state
    }

    /// main function to run the state machine to a terminal state
    pub fn main_loop(&mut self) -> IterationOutcome {
        loop {
            if let SolverState::Done(outcome) = self.advance() {
                return outcome.clone();
            }
        }
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn solve(mut self) -> IterationOutcome {
        let begin = Instant::now();
        let outcome = self.main_loop();
        let elapsed = begin.elapsed();
        info!("\n \n ITERATIONS \n \n {}", steps_table(outcome.steps()));
        calc_statistics(&outcome, elapsed.as_secs_f64());
        outcome
    }
}

/// step trace as a console table
pub fn steps_table(steps: &[Step]) -> String {
    let mut table = Table::new(steps);
    table.with(Style::modern_rounded());
    table.to_string()
}

fn calc_statistics(outcome: &IterationOutcome, elapsed: f64) {
    let mut builder = Builder::default();
    builder.push_record(["outcome".to_string(), outcome.kind().to_string()]);
    builder.push_record(["number of iterations".to_string(), outcome.iterations().to_string()]);
    if let Some(solution) = outcome.solution() {
        builder.push_record(["solution".to_string(), solution.to_string()]);
    }
    builder.push_record(["time elapsed, s".to_string(), format!("{:.6}", elapsed)]);
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    info!("\n \n CALC STATISTICS \n \n {}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use strum::IntoEnumIterator;

    fn run(function: &str, x0: f64) -> IterationOutcome {
        let expr = Expr::parse_expression(function).unwrap();
        NR::new(&expr, x0).solve()
    }

    fn assert_trace_is_chained(outcome: &IterationOutcome) {
        let steps = outcome.steps();
        assert_eq!(steps.len(), outcome.iterations());
        for (i, pair) in steps.windows(2).enumerate() {
            assert_eq!(pair[0].next_x, pair[1].x_n);
            assert_eq!(pair[0].iteration, i + 1);
            assert_eq!(pair[1].iteration, i + 2);
        }
        if let Some(solution) = outcome.solution() {
            assert_eq!(steps.last().unwrap().next_x, solution);
        }
    }

    #[test]
    fn test_converges_on_double_root() {
        let outcome = run("x^2 - 4x + 4", 1.0);
        assert_eq!(outcome.kind(), OutcomeKind::Converged);
        assert_relative_eq!(outcome.solution().unwrap(), 2.0, epsilon = 1e-5);
        assert!(outcome.iterations() <= MAX_ITERATIONS);
        assert!(outcome.steps().last().unwrap().error < DEFAULT_TOLERANCE);
        assert_trace_is_chained(&outcome);
    }

    #[test]
    fn test_first_step_values() {
        let outcome = run("x^2 - 2", 1.0);
        let first = outcome.steps()[0];
        assert_eq!(first.iteration, 1);
        assert_eq!(first.x_n, 1.0);
        assert_relative_eq!(first.f_x, -1.0);
        assert_relative_eq!(first.df_x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(first.next_x, 1.5, epsilon = 1e-6);
        assert_relative_eq!(first.error, 0.5, epsilon = 1e-6);
        assert_relative_eq!(outcome.solution().unwrap(), 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_derivative_vanishes_at_first_iteration() {
        let outcome = run("x^3", 0.0);
        match &outcome {
            IterationOutcome::DerivativeVanished {
                iteration, x, steps, ..
            } => {
                assert_eq!(*iteration, 1);
                assert_eq!(*x, 0.0);
                assert!(steps.is_empty());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(outcome.solution(), None);
        assert_eq!(outcome.estimates(0.0), vec![0.0]);
    }

    #[test]
    fn test_two_cycle_exhausts_iteration_bound() {
        let outcome = run("x^3 - 2x + 2", 0.0);
        assert_eq!(outcome.kind(), OutcomeKind::MaxIterationsExceeded);
        assert_eq!(outcome.iterations(), MAX_ITERATIONS);
        assert_trace_is_chained(&outcome);
        let last = outcome.steps().last().unwrap();
        assert_relative_eq!(last.error, 1.0, epsilon = 1e-6);
        match outcome.failure() {
            Some(SolveError::MaxIterationsExceeded { iterations, .. }) => {
                assert_eq!(iterations, MAX_ITERATIONS)
            }
            other => panic!("unexpected failure {:?}", other),
        }
    }

    #[test]
    fn test_configured_bound_is_respected() {
        let expr = Expr::parse_expression("x^3 - 2x + 2").unwrap();
        let config = SolverConfig {
            max_iterations: 5,
            ..SolverConfig::default()
        };
        let outcome = NR::new(&expr, 0.0).with_config(&config).solve();
        assert_eq!(outcome.kind(), OutcomeKind::MaxIterationsExceeded);
        assert_eq!(outcome.steps().len(), 5);
    }

    #[test]
    fn test_domain_error_keeps_steps() {
        // x1 = 3 - 3 ln 3 < 0, where log is undefined
        let outcome = run("log(x)", 3.0);
        match &outcome {
            IterationOutcome::DomainError {
                iteration,
                x,
                error,
                steps,
            } => {
                assert_eq!(*iteration, 2);
                assert_eq!(steps.len(), 1);
                assert_eq!(*x, steps[0].next_x);
                assert!(matches!(error, DomainError::LogOfNonPositive { .. }));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let failure = outcome.failure().unwrap();
        assert!(failure.to_string().contains("iteration 2"));
    }

    #[test]
    fn test_overflowing_step_is_a_domain_error() {
        // f(x0) / f'(x0) = -2e299 / 1e-9 overflows f64
        let outcome = run("1e-9*x - 1e299", -1e308);
        match &outcome {
            IterationOutcome::DomainError {
                iteration,
                x,
                error,
                steps,
            } => {
                assert_eq!(*iteration, 1);
                assert_eq!(*x, -1e308);
                assert_eq!(
                    *error,
                    DomainError::NonFinite {
                        operation: "newton step"
                    }
                );
                assert!(steps.is_empty());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(outcome.estimates(-1e308), vec![-1e308]);
    }

    #[test]
    fn test_domain_error_at_start() {
        let outcome = run("sqrt(x)", -4.0);
        assert_eq!(outcome.kind(), OutcomeKind::DomainError);
        assert_eq!(outcome.iterations(), 0);
    }

    #[test]
    fn test_tolerance_changes_iteration_count() {
        let expr = Expr::parse_expression("x^2 - 2").unwrap();
        let loose = NR::new(&expr, 10.0).with_tolerance(1e-1).solve();
        let tight = NR::new(&expr, 10.0).with_tolerance(1e-12).solve();
        assert!(loose.iterations() < tight.iterations());
    }

    #[test]
    fn test_state_machine_transitions() {
        let expr = Expr::parse_expression("x - 1").unwrap();
        let mut solver = NR::new(&expr, 5.0);
        assert_eq!(solver.state(), &SolverState::Init);
        assert_eq!(solver.advance(), &SolverState::Iterating { x_n: 5.0 });
        // linear function: the first step lands on the root, the second confirms it
        assert!(matches!(solver.advance(), SolverState::Iterating { .. }));
        let done = solver.advance().clone();
        assert!(matches!(done, SolverState::Done(IterationOutcome::Converged { .. })));
        // terminal state is final
        assert_eq!(solver.advance(), &done);
    }

    #[test]
    fn test_outcome_tags() {
        let tags: Vec<String> = OutcomeKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            tags,
            vec![
                "converged",
                "max_iterations_exceeded",
                "derivative_vanished",
                "domain_error"
            ]
        );
        assert_eq!(
            serde_json::to_string(&OutcomeKind::DerivativeVanished).unwrap(),
            "\"derivative_vanished\""
        );
    }

    #[test]
    fn test_steps_table_has_header() {
        let outcome = run("x^2 - 2", 1.0);
        let table = steps_table(outcome.steps());
        assert!(table.contains("iteration"));
        assert!(table.contains("f'(x_n)"));
    }

    #[test]
    fn test_random_quadratics_keep_trace_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..200 {
            let a: f64 = rng.random_range(-5.0..5.0);
            let b: f64 = rng.random_range(-5.0..5.0);
            let x0: f64 = rng.random_range(-10.0..10.0);
            let function = format!("(x - {}) * (x + {}) + 0.5 * sin(x)", a.abs(), b.abs());
            let outcome = run(&function, x0);
            assert_trace_is_chained(&outcome);
            assert!(outcome.iterations() <= MAX_ITERATIONS);
            assert_eq!(outcome.solution().is_some(), outcome.failure().is_none());
            let estimates = outcome.estimates(x0);
            assert_eq!(estimates.len(), outcome.iterations() + 1);
            assert_eq!(estimates[0], x0);
        }
    }
}
