//! Parameter domains and the pure membership/tolerance validator.

use doe_core::{CellValue, DoeError, ErrorInfo, RngHandle};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Domain descriptor for a single search space parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterDomain {
    /// Finite set of textual levels, matched exactly.
    Categorical {
        /// Allowed levels in declaration order.
        choices: Vec<String>,
    },
    /// Finite set of numeric levels with an allowed deviation radius.
    Discrete {
        /// Legal numeric levels in declaration order.
        levels: Vec<f64>,
        /// Maximum absolute deviation from the nearest level.
        tolerance: f64,
    },
    /// Closed numeric interval.
    Continuous {
        /// Inclusive lower bound.
        lower: f64,
        /// Inclusive upper bound.
        upper: f64,
    },
}

impl ParameterDomain {
    /// Checks a candidate value against the domain.
    ///
    /// For discrete numeric domains, `enforce_tolerance` controls whether the
    /// nearest-level distance check applies; with enforcement disabled any
    /// finite numeric value is accepted. Categorical and continuous membership
    /// is checked regardless of the flag.
    pub fn accepts(&self, value: &CellValue, enforce_tolerance: bool) -> bool {
        match self {
            ParameterDomain::Categorical { choices } => match value.as_text() {
                Some(text) => choices.iter().any(|choice| choice == text),
                None => false,
            },
            ParameterDomain::Discrete { levels, tolerance } => match value.as_f64() {
                Some(v) if v.is_finite() => {
                    if !enforce_tolerance {
                        return true;
                    }
                    levels.iter().any(|level| (v - level).abs() <= *tolerance)
                }
                _ => false,
            },
            ParameterDomain::Continuous { lower, upper } => match value.as_f64() {
                Some(v) if v.is_finite() => *lower <= v && v <= *upper,
                _ => false,
            },
        }
    }

    /// Draws one legal value from the domain.
    pub fn sample(&self, rng: &mut RngHandle) -> CellValue {
        match self {
            ParameterDomain::Categorical { choices } => {
                let choice = choices
                    .choose(rng.inner_mut())
                    .cloned()
                    .unwrap_or_default();
                CellValue::Text(choice)
            }
            ParameterDomain::Discrete { levels, .. } => {
                let level = levels.choose(rng.inner_mut()).copied().unwrap_or(0.0);
                CellValue::Float(level)
            }
            ParameterDomain::Continuous { lower, upper } => {
                let v = if lower < upper {
                    rng.inner_mut().gen_range(*lower..=*upper)
                } else {
                    *lower
                };
                CellValue::Float(v)
            }
        }
    }

    fn validate(&self, name: &str) -> Result<(), DoeError> {
        let reject = |code: &str, message: &str| {
            Err(DoeError::Space(
                ErrorInfo::new(code, message).with_context("parameter", name.to_string()),
            ))
        };
        match self {
            ParameterDomain::Categorical { choices } => {
                if choices.is_empty() {
                    return reject("space-empty-choices", "categorical domain has no levels");
                }
                for (idx, choice) in choices.iter().enumerate() {
                    if choices[..idx].contains(choice) {
                        return reject("space-duplicate-choice", "duplicate categorical level");
                    }
                }
            }
            ParameterDomain::Discrete { levels, tolerance } => {
                if levels.is_empty() {
                    return reject("space-empty-levels", "discrete domain has no levels");
                }
                if levels.iter().any(|level| !level.is_finite()) {
                    return reject("space-nonfinite-level", "discrete level must be finite");
                }
                for (idx, level) in levels.iter().enumerate() {
                    if levels[..idx].contains(level) {
                        return reject("space-duplicate-level", "duplicate discrete level");
                    }
                }
                if !tolerance.is_finite() || *tolerance < 0.0 {
                    return reject(
                        "space-invalid-tolerance",
                        "tolerance must be finite and non-negative",
                    );
                }
            }
            ParameterDomain::Continuous { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() {
                    return reject("space-nonfinite-bound", "continuous bounds must be finite");
                }
                if lower > upper {
                    return reject("space-inverted-bounds", "lower bound exceeds upper bound");
                }
            }
        }
        Ok(())
    }
}

/// Named parameter of a search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique parameter name, also the measurement column name.
    pub name: String,
    /// Domain of legal values.
    pub domain: ParameterDomain,
}

impl Parameter {
    /// Creates a parameter after validating its domain definition.
    pub fn new(name: impl Into<String>, domain: ParameterDomain) -> Result<Self, DoeError> {
        let parameter = Self {
            name: name.into(),
            domain,
        };
        parameter.validate()?;
        Ok(parameter)
    }

    /// Re-checks the definition, e.g. after deserialization.
    pub(crate) fn validate(&self) -> Result<(), DoeError> {
        if self.name.is_empty() {
            return Err(DoeError::Space(ErrorInfo::new(
                "space-empty-name",
                "parameter name must be non-empty",
            )));
        }
        self.domain.validate(&self.name)
    }
}
