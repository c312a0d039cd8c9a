//! Report output for workflow results.
//!
//! - Terminal: human-readable tables with colored status labels
//! - JSON: machine-readable serialization of runs and isotherms
//!
//! The isotherm CSV table is rendered by [`gcmc_sampler_core::Isotherm::to_csv`].

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_evaluation, format_isotherm};
