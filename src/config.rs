//! Workflow configuration.
//!
//! A workflow is described by a JSON document:
//!
//! ```json
//! {
//!   "name": "IRMOF-1 methane",
//!   "conditions": [
//!     { "temperatures": [208, 298],
//!       "pressures": { "kind": "adaptive", "start": "1k", "stop": "5M", "count": 12 } }
//!   ],
//!   "n_parallel": 2,
//!   "initial_steps": "20k",
//!   "g_req": 5.0
//! }
//! ```
//!
//! Pressures and step counts accept plain numbers or strings with a `k`
//! (thousand) or `M` (million) suffix.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use gcmc_sampler_core::analysis::{EquilibrationConfig, InefficiencyConfig};
use gcmc_sampler_core::constants::{DEFAULT_G_REQ, DEFAULT_MAX_ITERATIONS, DEFAULT_N_PARALLEL};
use gcmc_sampler_core::math::{linspace, logspace};
use gcmc_sampler_core::{ConditionId, ControllerConfig};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Workflow name used when none is given.
pub const DEFAULT_WORKFLOW_NAME: &str = "GCMCWorkflow";

/// Steps in the first generation of every replica.
pub const DEFAULT_INITIAL_STEPS: u64 = 10_000;

/// A non-negative number written either literally or with a `k`/`M` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr", into = "f64")]
pub struct Quantity(f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Number(f64),
    Text(String),
}

impl Quantity {
    /// Wrap a finite, non-negative value.
    pub fn new(value: f64) -> Result<Self, WorkflowError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WorkflowError::Config(format!(
                "quantity must be finite and non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Interpret as a whole number of simulation steps (at least one).
    pub fn as_steps(self) -> Result<u64, WorkflowError> {
        let rounded = self.0.round();
        if rounded < 1.0 || rounded > u64::MAX as f64 {
            return Err(WorkflowError::Config(format!(
                "step count must be at least 1, got {}",
                self.0
            )));
        }
        Ok(rounded as u64)
    }
}

impl FromStr for Quantity {
    type Err = WorkflowError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        let (digits, scale) = match text.chars().last() {
            Some('k') => (&text[..text.len() - 1], 1e3),
            Some('M') => (&text[..text.len() - 1], 1e6),
            Some(c) if c.is_ascii_alphabetic() => {
                return Err(WorkflowError::Config(format!(
                    "unknown suffix '{c}' in quantity '{raw}' (expected k or M)"
                )))
            }
            Some(_) => (text, 1.0),
            None => return Err(WorkflowError::Config("empty quantity".to_string())),
        };
        let value: f64 = digits
            .trim()
            .parse()
            .map_err(|_| WorkflowError::Config(format!("cannot parse quantity '{raw}'")))?;
        Self::new(value * scale)
    }
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = WorkflowError;

    fn try_from(repr: QuantityRepr) -> Result<Self, Self::Error> {
        match repr {
            QuantityRepr::Number(value) => Self::new(value),
            QuantityRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Quantity> for f64 {
    fn from(quantity: Quantity) -> f64 {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spacing of generated grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    Linear,
    #[default]
    Logarithmic,
}

impl Spacing {
    fn points(self, start: f64, stop: f64, count: usize) -> Vec<f64> {
        match self {
            Spacing::Linear => linspace(start, stop, count),
            Spacing::Logarithmic => logspace(start, stop, count),
        }
    }
}

/// How the pressures of a condition block are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PressureGrid {
    /// A fixed list.
    Explicit { values: Vec<Quantity> },

    /// `count` linearly spaced pressures, endpoints included.
    Linspace {
        start: Quantity,
        stop: Quantity,
        count: usize,
    },

    /// `count` log-spaced pressures, endpoints included.
    Logspace {
        start: Quantity,
        stop: Quantity,
        count: usize,
    },

    /// Half of `count` pressures up front; the rest are placed by the
    /// interval refiner once the first batch has finished.
    Adaptive {
        start: Quantity,
        stop: Quantity,
        count: usize,
        #[serde(default)]
        spacing: Spacing,
    },
}

impl PressureGrid {
    /// Pressures to simulate in the first round.
    pub fn initial_pressures(&self) -> Vec<f64> {
        match self {
            PressureGrid::Explicit { values } => values.iter().map(|q| q.value()).collect(),
            PressureGrid::Linspace { start, stop, count } => {
                linspace(start.value(), stop.value(), *count)
            }
            PressureGrid::Logspace { start, stop, count } => {
                logspace(start.value(), stop.value(), *count)
            }
            PressureGrid::Adaptive {
                start,
                stop,
                count,
                spacing,
            } => spacing.points(start.value(), stop.value(), count / 2),
        }
    }

    /// Pressures left for the refinement round.
    pub fn adaptive_points(&self) -> usize {
        match self {
            PressureGrid::Adaptive { count, .. } => count - count / 2,
            _ => 0,
        }
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        let (start, stop, count, log) = match self {
            PressureGrid::Explicit { values } => {
                if values.is_empty() {
                    return Err(WorkflowError::Config(
                        "explicit pressure list is empty".to_string(),
                    ));
                }
                return Ok(());
            }
            PressureGrid::Linspace { start, stop, count } => (start, stop, *count, false),
            PressureGrid::Logspace { start, stop, count } => (start, stop, *count, true),
            PressureGrid::Adaptive {
                start,
                stop,
                count,
                spacing,
            } => {
                if *count < 2 {
                    return Err(WorkflowError::Config(format!(
                        "adaptive grid needs count >= 2, got {count}"
                    )));
                }
                (start, stop, *count, *spacing == Spacing::Logarithmic)
            }
        };
        if count == 0 {
            return Err(WorkflowError::Config("pressure grid count is 0".to_string()));
        }
        if start.value() >= stop.value() {
            return Err(WorkflowError::Config(format!(
                "pressure range start {start} must be below stop {stop}"
            )));
        }
        if log && start.value() <= 0.0 {
            return Err(WorkflowError::Config(
                "logarithmic pressure range must start above 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A block of conditions: every temperature crossed with one pressure grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub temperatures: Vec<f64>,
    pub pressures: PressureGrid,
}

/// First-round pressures and refinement budget for one temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub temperature: f64,
    pub pressures: Vec<f64>,
    /// Extra pressures proposed after the first round (0 for fixed grids).
    pub refine: usize,
}

impl GridPlan {
    /// Conditions of the first round.
    pub fn conditions(&self) -> impl Iterator<Item = ConditionId> + '_ {
        self.pressures
            .iter()
            .map(move |&p| ConditionId::new(self.temperature, p))
    }
}

/// Top-level workflow description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub name: String,
    pub conditions: Vec<ConditionSpec>,
    /// Replicas per condition.
    pub n_parallel: usize,
    /// Steps in each replica's first generation.
    pub initial_steps: Quantity,
    pub g_req: f64,
    pub max_iterations: usize,
    pub equilibration: EquilibrationConfig,
    pub inefficiency: InefficiencyConfig,
    /// Seed for the synthetic simulator.
    pub seed: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKFLOW_NAME.to_string(),
            conditions: Vec::new(),
            n_parallel: DEFAULT_N_PARALLEL,
            initial_steps: Quantity(DEFAULT_INITIAL_STEPS as f64),
            g_req: DEFAULT_G_REQ,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            equilibration: EquilibrationConfig::default(),
            inefficiency: InefficiencyConfig::default(),
            seed: 0,
        }
    }
}

impl WorkflowConfig {
    /// Parse and validate a JSON workflow description.
    pub fn from_json_str(json: &str) -> Result<Self, WorkflowError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON workflow file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Config("workflow name is empty".to_string()));
        }
        if self.conditions.is_empty() {
            return Err(WorkflowError::Config("no conditions given".to_string()));
        }
        for spec in &self.conditions {
            if spec.temperatures.is_empty() {
                return Err(WorkflowError::Config(
                    "condition block without temperatures".to_string(),
                ));
            }
            if let Some(t) = spec.temperatures.iter().find(|t| !t.is_finite() || **t <= 0.0) {
                return Err(WorkflowError::Config(format!(
                    "temperature must be positive, got {t}"
                )));
            }
            spec.pressures.validate()?;
        }
        self.initial_steps.as_steps()?;
        self.controller_config().validate()?;
        Ok(())
    }

    /// Controller settings derived from this workflow.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new(self.n_parallel)
            .g_req(self.g_req)
            .max_iterations(self.max_iterations)
            .equilibration(self.equilibration)
            .inefficiency(self.inefficiency)
    }

    /// Steps in the first generation.
    pub fn initial_steps(&self) -> Result<u64, WorkflowError> {
        self.initial_steps.as_steps()
    }

    /// One plan per (temperature, grid) pair, in configuration order.
    pub fn grid_plans(&self) -> Vec<GridPlan> {
        self.conditions
            .iter()
            .flat_map(|spec| {
                spec.temperatures.iter().map(move |&temperature| GridPlan {
                    temperature,
                    pressures: spec.pressures.initial_pressures(),
                    refine: spec.pressures.adaptive_points(),
                })
            })
            .collect()
    }
}
