//! Driver loop: runs generations, feeds the controller, follows its requests.
//!
//! Replicas of a condition run in parallel; the controller evaluation is the
//! barrier that waits for all of them. Conditions are independent of each
//! other and are processed concurrently.

use std::path::PathBuf;

use gcmc_sampler_core::adaptive::{Condition, Evaluation, StepResult};
use gcmc_sampler_core::{
    propose_new_x, ConditionId, ConditionResult, ControllerConfig, Isotherm, IsothermPoint,
    ReplicaId, TimeSeries,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::adapter::SimulationAdapter;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;

/// One unit of simulation work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub condition: ConditionId,
    pub replica: ReplicaId,
    /// 0 for the first run of a replica, then 1, 2, ... for continuations.
    pub generation: usize,
    pub steps: u64,
}

/// Produces generations. Implementations must be callable from several
/// threads at once.
pub trait Simulator: Sync {
    /// Run `request.steps` more steps of the replica and return the new
    /// segment, with steps starting at 0.
    fn run(&self, request: &GenerationRequest) -> Result<TimeSeries, WorkflowError>;
}

/// Everything that happened to one condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionRun {
    pub id: ConditionId,
    pub result: ConditionResult,
    /// Controller evaluations in order; the last one is the decision.
    pub evaluations: Vec<Evaluation>,
}

/// A completed workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsothermRun {
    pub isotherm: Isotherm,
    pub runs: Vec<ConditionRun>,
}

/// Sample one condition until the controller reaches a decision.
pub fn run_condition<S: Simulator + ?Sized>(
    simulator: &S,
    id: ConditionId,
    config: &ControllerConfig,
    initial_steps: u64,
) -> Result<ConditionRun, WorkflowError> {
    let pending = (0..config.n_parallel)
        .map(|replica| GenerationRequest {
            condition: id,
            replica,
            generation: 0,
            steps: initial_steps,
        })
        .collect();
    drive(simulator, Condition::new(id, config.n_parallel), pending, config)
}

/// Continue a condition restored with [`rebuild_condition`].
///
/// The condition's newest generation is evaluated first. A condition that
/// is already terminal is returned as is, without new evaluations.
pub fn resume_condition<S: Simulator + ?Sized>(
    simulator: &S,
    condition: Condition,
    config: &ControllerConfig,
) -> Result<ConditionRun, WorkflowError> {
    if let Some(result) = condition.result() {
        return Ok(ConditionRun {
            id: condition.id(),
            result: result.clone(),
            evaluations: Vec::new(),
        });
    }
    drive(simulator, condition, Vec::new(), config)
}

fn drive<S: Simulator + ?Sized>(
    simulator: &S,
    mut condition: Condition,
    mut pending: Vec<GenerationRequest>,
    config: &ControllerConfig,
) -> Result<ConditionRun, WorkflowError> {
    let id = condition.id();
    let span = info_span!("condition", %id);
    let _enter = span.enter();
    let mut evaluations = Vec::new();

    loop {
        if !pending.is_empty() {
            let segments = pending
                .par_iter()
                .map(|request| simulator.run(request))
                .collect::<Result<Vec<_>, _>>()?;
            for (request, segment) in pending.iter().zip(&segments) {
                info!(
                    replica = request.replica,
                    generation = request.generation,
                    steps = request.steps,
                    samples = segment.len(),
                    "generation ingested"
                );
                condition.ingest(request.replica, segment)?;
            }
        }

        let evaluation = condition.evaluate(config)?;
        let decision = match &evaluation.outcome {
            StepResult::Decision(result) => Some(result.clone()),
            StepResult::Continue(request) => {
                info!(
                    iteration = request.iteration,
                    reason = %request.reason,
                    total_steps = request.total_steps,
                    "continuation requested"
                );
                pending = request
                    .replicas
                    .iter()
                    .map(|c| GenerationRequest {
                        condition: id,
                        replica: c.replica,
                        generation: c.generation,
                        steps: c.steps,
                    })
                    .collect();
                None
            }
        };
        evaluations.push(evaluation);

        if let Some(result) = decision {
            if result.timed_out {
                warn!(iterations = result.iterations, g = result.g, "condition timed out");
            }
            return Ok(ConditionRun {
                id,
                result,
                evaluations,
            });
        }
    }
}

/// Restore a condition from generation directories on disk.
///
/// `artifacts[r]` lists replica `r`'s generation directories in order. Each
/// replica's list is cut at its first unfinished generation, then all
/// replicas are cut to the shortest list so the controller sees complete
/// generations only.
pub fn rebuild_condition<A: SimulationAdapter + ?Sized>(
    adapter: &A,
    id: ConditionId,
    artifacts: &[Vec<PathBuf>],
    config: &ControllerConfig,
) -> Result<Condition, WorkflowError> {
    let mut generations = Vec::with_capacity(artifacts.len());
    for dirs in artifacts {
        let mut segments = Vec::new();
        for dir in dirs {
            if !adapter.check_finished(dir)? {
                break;
            }
            segments.push(adapter.parse(dir)?);
        }
        generations.push(segments);
    }

    let depth = generations.iter().map(Vec::len).min().unwrap_or(0);
    for segments in &mut generations {
        segments.truncate(depth);
    }
    debug!(condition = %id, adapter = adapter.name(), depth, "restoring condition");
    Ok(Condition::rebuild(id, &generations, config)?)
}

fn run_batch<S: Simulator + ?Sized>(
    simulator: &S,
    ids: &[ConditionId],
    config: &ControllerConfig,
    initial_steps: u64,
) -> Result<Vec<ConditionRun>, WorkflowError> {
    ids.par_iter()
        .map(|&id| run_condition(simulator, id, config, initial_steps))
        .collect()
}

/// Run every condition of a workflow, then refine adaptive grids once.
pub fn run_isotherm<S: Simulator + ?Sized>(
    simulator: &S,
    config: &WorkflowConfig,
) -> Result<IsothermRun, WorkflowError> {
    config.validate()?;
    let controller = config.controller_config();
    let initial_steps = config.initial_steps()?;
    let plans = config.grid_plans();

    let first: Vec<ConditionId> = plans.iter().flat_map(|plan| plan.conditions()).collect();
    info!(workflow = %config.name, conditions = first.len(), "starting first round");
    let mut runs = run_batch(simulator, &first, &controller, initial_steps)?;
    let mut isotherm: Isotherm = runs
        .iter()
        .map(|run| IsothermPoint::new(run.id, run.result.clone()))
        .collect();

    let mut refined = Vec::new();
    for plan in plans.iter().filter(|plan| plan.refine > 0) {
        let (pressures, means) = isotherm.curve(plan.temperature);
        if pressures.len() < 2 {
            warn!(
                temperature = plan.temperature,
                usable = pressures.len(),
                "too few finished pressures to refine"
            );
            continue;
        }
        let proposed = propose_new_x(&pressures, &means, plan.refine)?;
        refined.extend(
            proposed
                .into_iter()
                .map(|p| ConditionId::new(plan.temperature, p)),
        );
    }

    if !refined.is_empty() {
        info!(workflow = %config.name, conditions = refined.len(), "starting refinement round");
        let extra = run_batch(simulator, &refined, &controller, initial_steps)?;
        for run in &extra {
            isotherm.insert(IsothermPoint::new(run.id, run.result.clone()));
        }
        runs.extend(extra);
    }

    info!(
        workflow = %config.name,
        points = isotherm.len(),
        converged = isotherm.converged(),
        "workflow finished"
    );
    Ok(IsothermRun { isotherm, runs })
}
