//! Timeseries analysis: where equilibrium starts and how correlated the
//! equilibrated samples are.

mod equilibration;
mod inefficiency;

pub use equilibration::{detect_equilibration, find_equilibration, EquilibrationConfig, EquilibrationPoint};
pub use inefficiency::{estimate_g, estimate_inefficiency, InefficiencyConfig, InefficiencyEstimate};
