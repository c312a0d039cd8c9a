//! Statistical core for adaptive Grand-Canonical Monte Carlo sampling.
//!
//! This crate decides, from the timeseries a simulation has produced so far,
//! whether each replica of a thermodynamic condition has equilibrated and how
//! much more sampling is needed to reach a target number of statistically
//! independent samples. It performs no I/O and launches nothing; the
//! orchestration layer in the `gcmc-sampler` crate feeds it data and acts on
//! its decisions.
//!
//! # Modules
//!
//! - [`timeseries`]: validated `(step, value)` series and generation stitching
//! - [`analysis`]: equilibration detection and statistical inefficiency
//! - [`adaptive`]: the per-condition sampling controller
//! - [`refinement`]: proposing new pressures where an isotherm changes fastest
//! - [`isotherm`]: collecting per-condition results into a sorted table
//!
//! # Usage
//!
//! ```
//! use gcmc_sampler_core::{analysis::find_equilibration, TimeSeries};
//!
//! let steps: Vec<u64> = (0..40).map(|i| i * 100).collect();
//! let values: Vec<f64> = (0..40).map(|i| if i < 20 { i as f64 } else { 20.0 }).collect();
//! let series = TimeSeries::new(steps, values).unwrap();
//!
//! // A constant back half counts as flat; equilibration starts at its first step.
//! assert_eq!(find_equilibration(&series).unwrap(), 2000);
//! ```

pub mod adaptive;
pub mod analysis;
pub mod constants;
pub mod error;
pub mod isotherm;
pub mod math;
pub mod refinement;
pub mod result;
pub mod statistics;
pub mod timeseries;

pub use adaptive::{
    evaluate, Condition, ConditionId, ControllerConfig, ControllerPhase, Evaluation,
    IterationState, Replica, ReplicaId, StepResult,
};
pub use analysis::{
    detect_equilibration, estimate_g, estimate_inefficiency, find_equilibration,
    EquilibrationConfig, EquilibrationPoint, InefficiencyConfig, InefficiencyEstimate,
};
pub use error::{Error, InvalidInput, Result};
pub use isotherm::{Isotherm, IsothermPoint};
pub use refinement::{propose_new_x, Interval};
pub use result::{
    ConditionResult, ContinuationReason, ContinuationRequest, ReplicaContinuation,
    ReplicaReport, ReplicaStatus,
};
pub use timeseries::{Sample, TimeSeries};
