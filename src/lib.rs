//! # gcmc-sampler
//!
//! Adaptive re-sampling of Grand-Canonical Monte Carlo adsorption runs.
//!
//! Each (temperature, pressure) condition is simulated by several
//! independent replicas. After every generation the controller from
//! [`gcmc_sampler_core`] decides whether the stitched timeseries have
//! equilibrated and hold enough statistically independent samples; if not,
//! it requests a continuation sized to get there. Conditions that finish
//! are collected into an [`Isotherm`], and adaptive pressure grids are
//! refined where the isotherm rises fastest.
//!
//! This crate is the orchestration layer: workflow configuration, CSV
//! ingestion, the [`Simulator`] and [`SimulationAdapter`] boundaries, the
//! parallel driver loop and report output. Running real simulation engines
//! is left to implementors of [`Simulator`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use gcmc_sampler::{run_isotherm, SyntheticSimulator, WorkflowConfig};
//!
//! # fn main() -> Result<(), gcmc_sampler::WorkflowError> {
//! let config = WorkflowConfig::from_path("workflow.json")?;
//! let simulator = SyntheticSimulator::langmuir(config.seed);
//! let run = run_isotherm(&simulator, &config)?;
//!
//! println!("{}", gcmc_sampler::output::format_isotherm(&run.isotherm));
//! std::fs::write("results.csv", run.isotherm.to_csv())?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

mod adapter;
mod config;
mod error;
mod runner;
mod synthetic;

pub mod data;
pub mod output;

pub use adapter::{CsvResultsAdapter, SimulationAdapter};
pub use config::{ConditionSpec, GridPlan, PressureGrid, Quantity, Spacing, WorkflowConfig};
pub use error::WorkflowError;
pub use runner::{
    rebuild_condition, resume_condition, run_condition, run_isotherm, ConditionRun,
    GenerationRequest, IsothermRun, Simulator,
};
pub use synthetic::{SyntheticModel, SyntheticSimulator};

pub use gcmc_sampler_core::{
    ConditionId, ConditionResult, ControllerConfig, Isotherm, IsothermPoint, ReplicaId,
    TimeSeries,
};
