//! Errors surfaced by the orchestration layer.

use gcmc_sampler_core::{ConditionId, ReplicaId};
use thiserror::Error;

use crate::data::DataError;

/// Anything that can stop a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed input or contract violation reported by the sampling core.
    #[error(transparent)]
    Sampling(#[from] gcmc_sampler_core::Error),

    /// A timeseries file could not be loaded.
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse workflow configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid workflow configuration: {0}")]
    Config(String),

    /// The simulator failed to produce a generation.
    #[error("simulation of {condition} replica {replica} generation {generation} failed: {message}")]
    Simulation {
        condition: ConditionId,
        replica: ReplicaId,
        generation: usize,
        message: String,
    },
}
