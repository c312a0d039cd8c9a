//! Controller configuration.

use serde::{Deserialize, Serialize};

use crate::analysis::{EquilibrationConfig, InefficiencyConfig};
use crate::constants::{DEFAULT_G_REQ, DEFAULT_MAX_ITERATIONS, DEFAULT_N_PARALLEL};
use crate::error::{InvalidInput, Result};

/// Tuning of the per-condition sampling controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Required number of independent samples summed over all replicas.
    /// The condition finishes once the accumulated count strictly exceeds it.
    pub g_req: f64,

    /// Maximum number of controller evaluations before giving up.
    pub max_iterations: usize,

    /// Independent replicas per condition.
    pub n_parallel: usize,

    /// Equilibration detector tuning.
    pub equilibration: EquilibrationConfig,

    /// Inefficiency estimate tuning.
    pub inefficiency: InefficiencyConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            g_req: DEFAULT_G_REQ,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            n_parallel: DEFAULT_N_PARALLEL,
            equilibration: EquilibrationConfig::default(),
            inefficiency: InefficiencyConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Default configuration with `n_parallel` replicas.
    pub fn new(n_parallel: usize) -> Self {
        Self {
            n_parallel,
            ..Self::default()
        }
    }

    /// Builder method to set the required independent-sample count.
    pub fn g_req(mut self, g_req: f64) -> Self {
        self.g_req = g_req;
        self
    }

    /// Builder method to set the iteration limit.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder method to set the number of replicas.
    pub fn n_parallel(mut self, n_parallel: usize) -> Self {
        self.n_parallel = n_parallel;
        self
    }

    pub fn equilibration(mut self, equilibration: EquilibrationConfig) -> Self {
        self.equilibration = equilibration;
        self
    }

    pub fn inefficiency(mut self, inefficiency: InefficiencyConfig) -> Self {
        self.inefficiency = inefficiency;
        self
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.g_req >= 0.0 && self.g_req.is_finite()) {
            return Err(InvalidInput::Config(format!(
                "g_req must be a non-negative number, got {}",
                self.g_req
            ))
            .into());
        }
        if self.max_iterations == 0 {
            return Err(InvalidInput::Config("max_iterations must be at least 1".into()).into());
        }
        if self.n_parallel == 0 {
            return Err(InvalidInput::Config("n_parallel must be at least 1".into()).into());
        }
        self.equilibration.validate()?;
        self.inefficiency.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.g_req, 5.0);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.n_parallel, 1);
        assert_eq!(config.inefficiency.max_lag, 5_000_000);
        assert_eq!(config.inefficiency.cutoff, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ControllerConfig::new(3).g_req(10.0).max_iterations(8);
        assert_eq!(config.n_parallel, 3);
        assert_eq!(config.g_req, 10.0);
        assert_eq!(config.max_iterations, 8);
    }

    #[test]
    fn test_validation_rejects_degenerate_values() {
        assert!(ControllerConfig::default().max_iterations(0).validate().is_err());
        assert!(ControllerConfig::default().n_parallel(0).validate().is_err());
        assert!(ControllerConfig::default().g_req(f64::NAN).validate().is_err());
        assert!(ControllerConfig::default()
            .inefficiency(InefficiencyConfig::default().cutoff(2.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"g_req": 8.0, "inefficiency": {"cutoff": 0.2}}"#).unwrap();
        assert_eq!(config.g_req, 8.0);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.inefficiency.cutoff, 0.2);
        assert_eq!(config.inefficiency.max_lag, 5_000_000);
    }
}
