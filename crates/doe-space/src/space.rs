//! Search space assembly and canonical hashing.

use doe_core::{stable_hash_string, DoeError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::parameter::Parameter;

/// Ordered, immutable collection of parameters spanning the search domain.
///
/// Construction is the validating step: every parameter definition is checked
/// eagerly so that downstream components can rely on a well-formed space.
/// Deserialized snapshots must be passed back through [`SearchSpace::new`]
/// (the text reader does this) to restore that guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Creates a search space from validated parameters.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, DoeError> {
        if parameters.is_empty() {
            return Err(DoeError::Space(ErrorInfo::new(
                "space-empty",
                "search space needs at least one parameter",
            )));
        }
        for (idx, parameter) in parameters.iter().enumerate() {
            parameter.validate()?;
            if parameters[..idx].iter().any(|p| p.name == parameter.name) {
                return Err(DoeError::Space(
                    ErrorInfo::new("space-duplicate-parameter", "duplicate parameter name")
                        .with_context("parameter", parameter.name.clone()),
                ));
            }
        }
        Ok(Self { parameters })
    }

    /// Returns the ordered parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns the ordered parameter names (the configuration columns).
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    /// Computes a stable content hash of the space definition.
    pub fn canonical_hash(&self) -> Result<String, DoeError> {
        stable_hash_string(&self.parameters)
    }
}
