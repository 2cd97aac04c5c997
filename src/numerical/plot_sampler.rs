//! Plot-ready samples of an expression around the visited Newton estimates.
//!
//! The display domain brackets every estimate with a margin; a single estimate `c`
//! (or none, then `c = 0`) gets the window `[c - half_width, c + half_width]`.
//! Points where the expression is undefined are kept as gaps (`None`, `null` in JSON),
//! so `x_vals` and `y_vals` always have the configured length.
use crate::numerical::config::SolverConfig;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::linspace;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSample {
    pub x_vals: Vec<f64>,
    pub y_vals: Vec<Option<f64>>,
    /// estimates where the expression is defined, in visiting order
    pub iteration_points: Vec<f64>,
    pub iteration_y: Vec<f64>,
}

/// `[min - margin, max + margin]` over the finite estimates.
pub fn plot_domain(estimates: &[f64], margin: f64, half_width: f64) -> (f64, f64) {
    let window = |c: f64| (c - half_width, c + half_width);
    match estimates.iter().copied().filter(|x| x.is_finite()).minmax() {
        MinMaxResult::NoElements => window(0.0),
        MinMaxResult::OneElement(c) => window(c),
        MinMaxResult::MinMax(lo, hi) if lo == hi => window(lo),
        MinMaxResult::MinMax(lo, hi) => (lo - margin, hi + margin),
    }
}

/// Lazily evaluates `expr` at `samples` evenly spaced points of `[start, end]`.
pub fn sample_curve<'a>(
    expr: &'a Expr,
    start: f64,
    end: f64,
    samples: usize,
) -> impl Iterator<Item = (f64, Option<f64>)> + 'a {
    linspace(start, end, samples)
        .into_iter()
        .map(move |x| (x, expr.evaluate(x).ok()))
}

impl PlotSample {
    pub fn new(expr: &Expr, estimates: &[f64], config: &SolverConfig) -> PlotSample {
        let (start, end) = plot_domain(estimates, config.plot_margin, config.default_half_width);
        let (x_vals, y_vals): (Vec<f64>, Vec<Option<f64>>) =
            sample_curve(expr, start, end, config.plot_samples).unzip();
        let (iteration_points, iteration_y): (Vec<f64>, Vec<f64>) = estimates
            .iter()
            .filter_map(|&x| expr.evaluate(x).ok().map(|y| (x, y)))
            .unzip();
        PlotSample {
            x_vals,
            y_vals,
            iteration_points,
            iteration_y,
        }
    }

    /// Runs of consecutive defined points; a gap ends a segment.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (&x, y) in self.x_vals.iter().zip(&self.y_vals) {
            match y {
                Some(y) => current.push((x, *y)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.x_vals.iter().copied().minmax().into_option()
    }

    /// over the curve and the markers
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.y_vals
            .iter()
            .flatten()
            .chain(self.iteration_y.iter())
            .copied()
            .minmax()
            .into_option()
    }
}
