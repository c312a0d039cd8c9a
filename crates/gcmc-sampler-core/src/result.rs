//! Per-condition outcomes, per-replica diagnostics and continuation requests.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::adaptive::{ConditionId, ReplicaId};

/// What the controller concluded about one replica in one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaStatus {
    /// Equilibrated, with an inefficiency estimate.
    Equilibrated,
    /// The back half still drifts.
    NotEquilibrated,
    /// Equilibrated, but the production period could not yield an
    /// inefficiency estimate yet.
    InsufficientData,
}

impl fmt::Display for ReplicaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicaStatus::Equilibrated => write!(f, "equilibrated"),
            ReplicaStatus::NotEquilibrated => write!(f, "not equilibrated"),
            ReplicaStatus::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

/// Diagnostics for one replica from one controller evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaReport {
    pub replica: ReplicaId,
    pub status: ReplicaStatus,
    /// Samples in the stitched series.
    pub samples: usize,
    /// Last step of the stitched series.
    pub last_step: u64,
    /// First equilibrated step.
    pub equilibration_step: Option<u64>,
    /// Steps from the equilibration point to the end of the series.
    pub production_steps: u64,
    /// Contribution to the condition's independent-sample count.
    pub credit: f64,
    /// Statistical inefficiency of the production period, in steps.
    pub g: Option<u64>,
    /// Production steps divided by `g`.
    pub independent_samples: Option<u64>,
    /// Mean of the production period.
    pub mean: Option<f64>,
    /// Sample standard deviation of the production period.
    pub std: Option<f64>,
}

impl ReplicaReport {
    pub(crate) fn not_equilibrated(replica: ReplicaId, samples: usize, last_step: u64) -> Self {
        Self {
            replica,
            status: ReplicaStatus::NotEquilibrated,
            samples,
            last_step,
            equilibration_step: None,
            production_steps: 0,
            credit: 0.0,
            g: None,
            independent_samples: None,
            mean: None,
            std: None,
        }
    }

    pub fn is_equilibrated(&self) -> bool {
        self.status != ReplicaStatus::NotEquilibrated
    }
}

/// Final outcome for a condition.
///
/// `mean` and `std` are present only when every replica equilibrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub equilibrated: bool,
    /// Enough independent samples were collected.
    pub finished: bool,
    /// The iteration limit was reached first.
    pub timed_out: bool,
    /// Accumulated independent-sample count over all replicas.
    pub g: f64,
    /// Controller evaluations performed.
    pub iterations: usize,
}

impl ConditionResult {
    /// Short human-readable status.
    pub fn status_label(&self) -> &'static str {
        match (self.finished, self.equilibrated) {
            (true, _) => "converged",
            (false, true) => "timed out",
            (false, false) => "not equilibrated",
        }
    }
}

/// Why more sampling was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationReason {
    /// At least one replica has not equilibrated.
    NotEquilibrated,
    /// All replicas equilibrated but an inefficiency estimate failed.
    InsufficientData,
    /// Equilibrated, but fewer independent samples than required.
    TooFewIndependentSamples,
}

impl fmt::Display for ContinuationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuationReason::NotEquilibrated => write!(f, "not equilibrated"),
            ContinuationReason::InsufficientData => write!(f, "insufficient data"),
            ContinuationReason::TooFewIndependentSamples => write!(f, "too few independent samples"),
        }
    }
}

/// Continuation of one replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaContinuation {
    pub replica: ReplicaId,
    /// Index of the generation to produce.
    pub generation: usize,
    /// Last step of the stitched series; the continuation resumes from it.
    pub resume_from_step: u64,
    /// Additional steps to simulate.
    pub steps: u64,
}

/// Request for one more generation on every replica of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationRequest {
    pub condition: ConditionId,
    /// Evaluation index that will consume the new generation.
    pub iteration: usize,
    pub reason: ContinuationReason,
    /// Additional steps over all replicas.
    pub total_steps: u64,
    pub replicas: Vec<ReplicaContinuation>,
}
