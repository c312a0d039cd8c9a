//! Capability interface to simulation engines.
//!
//! The controller never needs to know which engine produced a generation.
//! An adapter answers two questions about a generation's output directory:
//! has it finished, and what timeseries did it produce.

use std::path::{Path, PathBuf};

use gcmc_sampler_core::TimeSeries;

use crate::data::read_timeseries;
use crate::error::WorkflowError;

/// Default results file written by a generation.
pub const DEFAULT_RESULTS_FILE: &str = "results.csv";

/// Reads the output of one simulation engine.
pub trait SimulationAdapter: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Whether the generation stored under `artifact` has completed.
    fn check_finished(&self, artifact: &Path) -> Result<bool, WorkflowError>;

    /// Extract the generation's timeseries. Steps start at 0.
    fn parse(&self, artifact: &Path) -> Result<TimeSeries, WorkflowError>;
}

/// Adapter for engines that leave a `time,<observable>` CSV in the
/// generation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvResultsAdapter {
    file_name: String,
}

impl Default for CsvResultsAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_FILE)
    }
}

impl CsvResultsAdapter {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Location of the results file for a generation directory.
    pub fn results_path(&self, artifact: &Path) -> PathBuf {
        artifact.join(&self.file_name)
    }
}

impl SimulationAdapter for CsvResultsAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    fn check_finished(&self, artifact: &Path) -> Result<bool, WorkflowError> {
        match std::fs::metadata(self.results_path(artifact)) {
            Ok(meta) => Ok(meta.is_file() && meta.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(&self, artifact: &Path) -> Result<TimeSeries, WorkflowError> {
        Ok(read_timeseries(&self.results_path(artifact))?)
    }
}
