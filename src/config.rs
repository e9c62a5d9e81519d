//! Numeric configuration carried by a [`NumericContext`](crate::quantum::NumericContext).

use serde::{Deserialize, Serialize};

use crate::error::StateResult;

/// Tolerances and execution switches shared by every state attached to a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Absolute tolerance for normalization and trace checks.
    pub tolerance: f64,

    /// Hermiticity tolerance relative to the largest matrix element.
    pub hermitian_tolerance: f64,

    /// Reject non-Hermitian matrices before Wigner evaluation.
    pub validate_hermitian: bool,

    /// Evaluate grid rows on the rayon pool.
    pub parallel: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            tolerance: 1e-10,
            hermitian_tolerance: 1e-8,
            validate_hermitian: true,
            parallel: true,
        }
    }
}

impl ContextConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(text: &str) -> StateResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_hermitian_tolerance(mut self, tolerance: f64) -> Self {
        self.hermitian_tolerance = tolerance;
        self
    }

    pub fn with_hermitian_validation(mut self, enabled: bool) -> Self {
        self.validate_hermitian = enabled;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
