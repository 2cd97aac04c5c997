//! Incoming calculation request and its validation.
//!
//! `x0` and `epsilon` arrive either as JSON numbers or as strings typed into a form;
//! both are accepted. An empty `epsilon` string means "use the default tolerance".
use crate::error::RequestValidationError;
use serde::{Deserialize, Serialize};

/// A JSON number or the text of a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// `None` when the text does not read as a number
    fn to_f64(&self) -> Option<f64> {
        match self {
            NumberInput::Number(val) => Some(*val),
            NumberInput::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, NumberInput::Text(text) if text.trim().is_empty())
    }

    fn raw(&self) -> String {
        match self {
            NumberInput::Number(val) => val.to_string(),
            NumberInput::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for NumberInput {
    fn from(val: f64) -> Self {
        NumberInput::Number(val)
    }
}

impl From<&str> for NumberInput {
    fn from(text: &str) -> Self {
        NumberInput::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest {
    /// formula in `x`
    #[serde(default)]
    pub function: String,
    /// starting point
    pub x0: NumberInput,
    /// convergence tolerance; absent, `null` or blank means the configured default
    #[serde(default)]
    pub epsilon: Option<NumberInput>,
}

/// A request whose numbers are known to be usable.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    pub function: String,
    pub x0: f64,
    pub epsilon: Option<f64>,
}

impl CalcRequest {
    pub fn new(function: &str, x0: impl Into<NumberInput>, epsilon: Option<NumberInput>) -> Self {
        CalcRequest {
            function: function.to_string(),
            x0: x0.into(),
            epsilon,
        }
    }

    /// Checks `function`, `x0` and `epsilon` before anything is parsed or iterated.
    pub fn validate(&self) -> Result<ValidRequest, RequestValidationError> {
        if self.function.trim().is_empty() {
            return Err(RequestValidationError::MissingFunction);
        }
        let x0 = self
            .x0
            .to_f64()
            .ok_or_else(|| RequestValidationError::InvalidX0 {
                value: self.x0.raw(),
            })?;
        if !x0.is_finite() {
            return Err(RequestValidationError::NonFiniteX0 { value: x0 });
        }
        let epsilon = match &self.epsilon {
            None => None,
            Some(input) if input.is_blank() => None,
            Some(input) => {
                let eps = input
                    .to_f64()
                    .ok_or_else(|| RequestValidationError::InvalidEpsilon { value: input.raw() })?;
                if !(eps.is_finite() && eps > 0.0) {
                    return Err(RequestValidationError::NonPositiveEpsilon { value: eps });
                }
                Some(eps)
            }
        };
        Ok(ValidRequest {
            function: self.function.clone(),
            x0,
            epsilon,
        })
    }
}
