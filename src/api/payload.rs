use crate::numerical::NR::{IterationOutcome, OutcomeKind, Step};
use crate::numerical::plot_sampler::PlotSample;
use crate::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};

/// Response body of a finished calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub steps: Vec<Step>,
    /// `None` (`null`) unless the run converged
    pub solution: Option<f64>,
    pub iterations: usize,
    pub plot_data: PlotSample,
    pub function_latex: String,
    pub outcome: OutcomeKind,
}

impl ResultPayload {
    pub fn assemble(expr: &Expr, outcome: &IterationOutcome, plot_data: PlotSample) -> Self {
        ResultPayload {
            steps: outcome.steps().to_vec(),
            solution: outcome.solution(),
            iterations: outcome.iterations(),
            plot_data,
            function_latex: expr.to_latex(),
            outcome: outcome.kind(),
        }
    }
}

/// Failure response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
