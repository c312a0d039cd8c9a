//! One controller evaluation over the replicas of a condition.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{detect_equilibration, estimate_inefficiency};
use crate::constants::MIN_REPLICA_SAMPLES;
use crate::error::{Error, InvalidInput, Result};
use crate::math::mean;
use crate::result::{
    ConditionResult, ContinuationReason, ContinuationRequest, ReplicaContinuation, ReplicaReport,
    ReplicaStatus,
};

use super::{ConditionId, ControllerConfig, Replica};

/// Termination flags derived from the aggregated replica diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Every replica equilibrated.
    pub equilibrated: bool,
    /// Every replica equilibrated and yielded an inefficiency estimate.
    pub ready: bool,
    /// Independent samples accumulated over all replicas.
    pub g_total: f64,
    pub finished: bool,
    pub timed_out: bool,
}

impl Verdict {
    /// Decide termination for evaluation `iteration` (zero-based).
    ///
    /// The condition finishes only when every replica is usable and
    /// `g_total` strictly exceeds `g_req`; otherwise it times out once
    /// `iteration + 1` reaches the iteration limit.
    pub fn new(
        iteration: usize,
        equilibrated: bool,
        ready: bool,
        g_total: f64,
        config: &ControllerConfig,
    ) -> Self {
        let ready = equilibrated && ready;
        let finished = ready && g_total > config.g_req;
        let timed_out = !finished && iteration + 1 >= config.max_iterations;
        Self {
            equilibrated,
            ready,
            g_total,
            finished,
            timed_out,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.finished || self.timed_out
    }
}

/// Result of a single controller evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepResult {
    /// The condition is done (converged or out of iterations).
    Decision(ConditionResult),
    /// Run one more generation on every replica.
    Continue(ContinuationRequest),
}

impl StepResult {
    /// Check if a decision was reached.
    pub fn is_decision(&self) -> bool {
        matches!(self, StepResult::Decision(_))
    }

    /// Get the result if a decision was reached.
    pub fn into_decision(self) -> Option<ConditionResult> {
        match self {
            StepResult::Decision(result) => Some(result),
            StepResult::Continue(_) => None,
        }
    }

    /// Get the continuation if more sampling was requested.
    pub fn continuation(&self) -> Option<&ContinuationRequest> {
        match self {
            StepResult::Decision(_) => None,
            StepResult::Continue(request) => Some(request),
        }
    }
}

/// Everything one evaluation computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub condition: ConditionId,
    /// Zero-based evaluation index.
    pub iteration: usize,
    pub reports: Vec<ReplicaReport>,
    pub verdict: Verdict,
    pub outcome: StepResult,
}

/// Analyse one replica's stitched series.
fn analyse_replica(replica: &Replica, config: &ControllerConfig) -> Result<ReplicaReport> {
    let series = replica.series();
    if series.len() < MIN_REPLICA_SAMPLES {
        return Err(InvalidInput::TooFewSamples {
            got: series.len(),
            min: MIN_REPLICA_SAMPLES,
        }
        .into());
    }
    let last_step = series.last_step().unwrap_or(0);

    // Short but well-formed series just need more steps.
    let point = match detect_equilibration(series, &config.equilibration) {
        Ok(point) => point,
        Err(Error::NotEquilibrated | Error::InvalidInput(InvalidInput::TooFewSamples { .. })) => {
            debug!(replica = replica.id(), samples = series.len(), "not equilibrated");
            return Ok(ReplicaReport::not_equilibrated(
                replica.id(),
                series.len(),
                last_step,
            ));
        }
        Err(e) => return Err(e),
    };

    let production = series.slice_from_index(point.index);
    let production_steps = production.span();
    let credit = production_steps as f64 / point.step.max(1) as f64;
    let summary = production.summary();

    let (status, g) = match estimate_inefficiency(&production, &config.inefficiency) {
        Ok(estimate) => (ReplicaStatus::Equilibrated, Some(estimate.g)),
        Err(e) if e.is_recoverable() || matches!(e, Error::InvalidInput(InvalidInput::TooFewSamples { .. })) => {
            warn!(replica = replica.id(), error = %e, "no inefficiency estimate for production period");
            (ReplicaStatus::InsufficientData, None)
        }
        Err(e) => return Err(e),
    };

    debug!(
        replica = replica.id(),
        equilibration_step = point.step,
        production_steps,
        credit,
        g = ?g,
        "replica analysed"
    );

    Ok(ReplicaReport {
        replica: replica.id(),
        status,
        samples: series.len(),
        last_step,
        equilibration_step: Some(point.step),
        production_steps,
        credit,
        g,
        independent_samples: g.map(|g| production.independent_samples(g)),
        mean: Some(summary.mean),
        std: Some(summary.std()),
    })
}

/// Run evaluation `iteration` over `replicas`.
///
/// Each replica is checked for equilibration; equilibrated replicas credit
/// `production_steps / equilibration_step` towards the condition's
/// independent-sample count. A terminal verdict yields a
/// [`ConditionResult`]; otherwise a [`ContinuationRequest`] asks for either
/// a doubling of the simulated length (when any replica is unusable) or the
/// length projected to reach `g_req + 1` independent samples, split evenly
/// over the replicas.
///
/// # Errors
///
/// [`InvalidInput`] when there are no replicas, a replica holds fewer than
/// two samples, or a series is malformed.
pub fn evaluate(
    condition: ConditionId,
    iteration: usize,
    replicas: &[Replica],
    config: &ControllerConfig,
) -> Result<Evaluation> {
    let Some(first) = replicas.first() else {
        return Err(InvalidInput::Config("a condition needs at least one replica".into()).into());
    };

    let reports = replicas
        .iter()
        .map(|replica| analyse_replica(replica, config))
        .collect::<Result<Vec<_>>>()?;

    let equilibrated = reports.iter().all(ReplicaReport::is_equilibrated);
    let ready = reports.iter().all(|r| r.status == ReplicaStatus::Equilibrated);
    let g_total: f64 = reports.iter().map(|r| r.credit).sum();
    let verdict = Verdict::new(iteration, equilibrated, ready, g_total, config);

    let outcome = if verdict.is_terminal() {
        let (mean_value, std_value) = if verdict.equilibrated {
            let means: Vec<f64> = reports.iter().filter_map(|r| r.mean).collect();
            let stds: Vec<f64> = reports.iter().filter_map(|r| r.std).collect();
            (mean(&means), mean(&stds))
        } else {
            (None, None)
        };
        let result = ConditionResult {
            mean: mean_value,
            std: std_value,
            equilibrated: verdict.equilibrated,
            finished: verdict.finished,
            timed_out: verdict.timed_out,
            g: g_total,
            iterations: iteration + 1,
        };
        info!(
            %condition,
            status = result.status_label(),
            g = g_total,
            iterations = result.iterations,
            "condition terminated"
        );
        StepResult::Decision(result)
    } else {
        let reason = if !verdict.equilibrated {
            ContinuationReason::NotEquilibrated
        } else if !verdict.ready {
            ContinuationReason::InsufficientData
        } else {
            ContinuationReason::TooFewIndependentSamples
        };

        let total_steps = if verdict.ready && g_total > 0.0 {
            let production: u64 = reports.iter().map(|r| r.production_steps).sum();
            (production as f64 / g_total * (config.g_req + 1.0)) as u64
        } else {
            first.series().last_step().unwrap_or(0).saturating_mul(2)
        };
        let per_replica = (total_steps / replicas.len() as u64).max(1);

        info!(
            %condition,
            iteration,
            %reason,
            g = g_total,
            total_steps,
            "requesting another generation"
        );

        StepResult::Continue(ContinuationRequest {
            condition,
            iteration: iteration + 1,
            reason,
            total_steps,
            replicas: replicas
                .iter()
                .map(|replica| ReplicaContinuation {
                    replica: replica.id(),
                    generation: replica.generations(),
                    resume_from_step: replica.series().last_step().unwrap_or(0),
                    steps: per_replica,
                })
                .collect(),
        })
    };

    Ok(Evaluation {
        condition,
        iteration,
        reports,
        verdict,
        outcome,
    })
}
