//! Solver and plot settings.
//!
//! Every request is computed with an explicit `&SolverConfig`; nothing is read from
//! global state. Defaults are the public contract of the calculator, a task file
//! (see [`crate::Utils::task_parser`]) may override them:
//! ```text
//! solver_settings
//!   tolerance: 1e-8
//!   max_iterations: 50
//!   derivative_step: 1e-6
//!   vanishing_threshold: 1e-10
//! plot_settings
//!   samples: 400
//!   margin: 2.0
//!   default_half_width: 5
//! logging
//!   loglevel: warn
//! ```
use crate::Utils::task_parser::{Value, parse_document};
use crate::error::ConfigError;
pub use crate::symbolic::utils::DERIVATIVE_STEP;
use log::info;
use std::path::Path;

/// Tolerance used when the request carries no `epsilon`.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Iteration bound of one Newton-Raphson run.
pub const MAX_ITERATIONS: usize = 100;
/// `|f'(x_n)|` below this ends the run as derivative-vanished.
pub const VANISHING_THRESHOLD: f64 = 1e-10;
/// Number of abscissas in a plot sample.
pub const PLOT_SAMPLES: usize = 200;
/// Padding added on both sides of the visited estimates.
pub const PLOT_MARGIN: f64 = 2.0;
/// Half width of the window around a single estimate.
pub const DEFAULT_HALF_WIDTH: f64 = 5.0;

/// upper bounds that keep per-request work bounded even with a task file
const ITERATIONS_LIMIT: usize = 10_000;
const SAMPLES_LIMIT: usize = 10_000;

const LOG_LEVELS: [&str; 6] = ["debug", "info", "warn", "error", "off", "none"];

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub derivative_step: f64,
    pub vanishing_threshold: f64,
    pub plot_samples: usize,
    pub plot_margin: f64,
    pub default_half_width: f64,
    pub loglevel: Option<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: MAX_ITERATIONS,
            derivative_step: DERIVATIVE_STEP,
            vanishing_threshold: VANISHING_THRESHOLD,
            plot_samples: PLOT_SAMPLES,
            plot_margin: PLOT_MARGIN,
            default_half_width: DEFAULT_HALF_WIDTH,
            loglevel: Some("info".to_string()),
        }
    }
}

fn single<'a>(key: &str, values: &'a [Value]) -> Result<&'a Value, ConfigError> {
    match values {
        [value] => Ok(value),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a single value",
            got: values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn float(key: &str, values: &[Value]) -> Result<f64, ConfigError> {
    let value = single(key, values)?;
    value.as_float().ok_or_else(|| ConfigError::WrongType {
        key: key.to_string(),
        expected: "a number",
        got: value.to_string(),
    })
}

fn count(key: &str, values: &[Value]) -> Result<usize, ConfigError> {
    let value = single(key, values)?;
    let int = value.as_integer().ok_or_else(|| ConfigError::WrongType {
        key: key.to_string(),
        expected: "an integer",
        got: value.to_string(),
    })?;
    usize::try_from(int).map_err(|_| out_of_range(key, "must not be negative"))
}

fn text(key: &str, values: &[Value]) -> Result<String, ConfigError> {
    let value = single(key, values)?;
    value
        .as_string()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::WrongType {
            key: key.to_string(),
            expected: "a word",
            got: value.to_string(),
        })
}

fn out_of_range(key: &str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl SolverConfig {
    /// Reads and applies a task file on top of the defaults.
    pub fn from_task_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_task_str(&content)?;
        info!("solver settings loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_task_str(input: &str) -> Result<Self, ConfigError> {
        let document = parse_document(input)?;
        let mut config = SolverConfig::default();
        for (section, pairs) in &document {
            for (key, values) in pairs {
                config.apply(section, key, values)?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, section: &str, key: &str, values: &[Value]) -> Result<(), ConfigError> {
        match (section, key) {
            ("solver_settings", "tolerance") => self.tolerance = float(key, values)?,
            ("solver_settings", "max_iterations") => self.max_iterations = count(key, values)?,
            ("solver_settings", "derivative_step") => self.derivative_step = float(key, values)?,
            ("solver_settings", "vanishing_threshold") => {
                self.vanishing_threshold = float(key, values)?
            }
            ("plot_settings", "samples") => self.plot_samples = count(key, values)?,
            ("plot_settings", "margin") => self.plot_margin = float(key, values)?,
            ("plot_settings", "default_half_width") => {
                self.default_half_width = float(key, values)?
            }
            ("logging", "loglevel") => self.loglevel = Some(text(key, values)?.to_lowercase()),
            ("solver_settings" | "plot_settings" | "logging", _) => {
                return Err(ConfigError::UnknownKey {
                    section: section.to_string(),
                    key: key.to_string(),
                });
            }
            _ => return Err(ConfigError::UnknownSection(section.to_string())),
        }
        Ok(())
    }

    /// Checks the ranges of all settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(out_of_range("tolerance", "must be finite and greater than 0"));
        }
        if self.max_iterations == 0 || self.max_iterations > ITERATIONS_LIMIT {
            return Err(out_of_range(
                "max_iterations",
                &format!("must be between 1 and {}", ITERATIONS_LIMIT),
            ));
        }
        if !(self.derivative_step.is_finite() && self.derivative_step > 0.0 && self.derivative_step < 1.0) {
            return Err(out_of_range("derivative_step", "must be between 0 and 1"));
        }
        if !(self.vanishing_threshold.is_finite() && self.vanishing_threshold >= 0.0) {
            return Err(out_of_range("vanishing_threshold", "must be finite and not negative"));
        }
        if self.plot_samples < 2 || self.plot_samples > SAMPLES_LIMIT {
            return Err(out_of_range(
                "samples",
                &format!("must be between 2 and {}", SAMPLES_LIMIT),
            ));
        }
        if !(self.plot_margin.is_finite() && self.plot_margin >= 0.0) {
            return Err(out_of_range("margin", "must be finite and not negative"));
        }
        if !(self.default_half_width.is_finite() && self.default_half_width > 0.0) {
            return Err(out_of_range("default_half_width", "must be finite and greater than 0"));
        }
        if let Some(level) = &self.loglevel {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(out_of_range(
                    "loglevel",
                    "must be debug, info, warn, error, off or none",
                ));
            }
        }
        Ok(())
    }
}
