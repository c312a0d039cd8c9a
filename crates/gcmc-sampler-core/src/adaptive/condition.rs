//! Conditions and their replicas.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvalidInput, Result};
use crate::result::{ConditionResult, ReplicaReport};
use crate::timeseries::TimeSeries;

use super::step::{evaluate, Evaluation, StepResult};
use super::{ControllerConfig, IterationState};

/// Index of a replica within its condition.
pub type ReplicaId = usize;

/// A thermodynamic state point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionId {
    /// Temperature in K.
    pub temperature: f64,
    /// Pressure in Pa.
    pub pressure: f64,
}

impl ConditionId {
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            pressure,
        }
    }

    /// Total order by temperature, then pressure.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.temperature
            .total_cmp(&other.temperature)
            .then_with(|| self.pressure.total_cmp(&other.pressure))
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T={}K P={}Pa", self.temperature, self.pressure)
    }
}

/// One independent simulation of a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Replica {
    id: ReplicaId,
    /// All generations so far, stitched.
    series: TimeSeries,
    /// Generations ingested.
    generations: usize,
    /// Most recent equilibration step.
    last_equilibration: Option<u64>,
    /// Most recent inefficiency estimate.
    last_g: Option<u64>,
}

impl Replica {
    pub fn new(id: ReplicaId) -> Self {
        Self {
            id,
            series: TimeSeries::empty(),
            generations: 0,
            last_equilibration: None,
            last_g: None,
        }
    }

    pub fn id(&self) -> ReplicaId {
        self.id
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn last_equilibration(&self) -> Option<u64> {
        self.last_equilibration
    }

    pub fn last_g(&self) -> Option<u64> {
        self.last_g
    }

    /// Stitch the next generation onto this replica's series.
    pub fn ingest(&mut self, segment: &TimeSeries) -> Result<()> {
        self.series.append(segment)?;
        self.generations += 1;
        Ok(())
    }

    fn record(&mut self, report: &ReplicaReport) {
        self.last_equilibration = report.equilibration_step;
        self.last_g = report.g;
    }
}

/// A condition: its replicas, controller state and final result.
#[derive(Debug, Clone)]
pub struct Condition {
    id: ConditionId,
    replicas: Vec<Replica>,
    state: IterationState,
    last_evaluation: Option<Evaluation>,
    result: Option<ConditionResult>,
}

impl Condition {
    /// A fresh condition with `n_replicas` empty replicas.
    pub fn new(id: ConditionId, n_replicas: usize) -> Self {
        Self {
            id,
            replicas: (0..n_replicas).map(Replica::new).collect(),
            state: IterationState::new(n_replicas),
            last_evaluation: None,
            result: None,
        }
    }

    /// Reconstruct a condition from persisted generations.
    ///
    /// `generations[r]` holds replica `r`'s segments in order. Every
    /// evaluation is replayed, so the returned condition is in exactly the
    /// state the live controller reached. Replay stops at the first terminal
    /// evaluation; later generations are ignored. If the last generation has
    /// not been evaluated yet, the next [`Condition::evaluate`] call does so.
    pub fn rebuild(
        id: ConditionId,
        generations: &[Vec<TimeSeries>],
        config: &ControllerConfig,
    ) -> Result<Self> {
        let mut condition = Self::new(id, generations.len());
        let depth = generations.iter().map(Vec::len).max().unwrap_or(0);

        for (replica, segments) in generations.iter().enumerate() {
            if segments.len() != depth {
                return Err(InvalidInput::IncompleteGeneration {
                    replica,
                    received: segments.len(),
                    expected: depth,
                }
                .into());
            }
        }

        for generation in 0..depth {
            for (replica, segments) in generations.iter().enumerate() {
                condition.ingest(replica, &segments[generation])?;
            }
            if generation + 1 < depth {
                condition.evaluate(config)?;
                if condition.is_terminal() {
                    break;
                }
            }
        }
        debug!(condition = %id, depth, phase = %condition.state.phase(), "condition rebuilt");
        Ok(condition)
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn replicas(&self) -> &[Replica] {
        &self.replicas
    }

    pub fn state(&self) -> &IterationState {
        &self.state
    }

    /// Final result, once terminal.
    pub fn result(&self) -> Option<&ConditionResult> {
        self.result.as_ref()
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Add the next generation for `replica`.
    ///
    /// Each replica accepts exactly one generation per evaluation.
    pub fn ingest(&mut self, replica: ReplicaId, segment: &TimeSeries) -> Result<()> {
        if self.is_terminal() {
            return Err(InvalidInput::ConditionTerminated(self.id.to_string()).into());
        }
        let n_replicas = self.replicas.len();
        let expected = self.state.iteration() + 1;
        let target = self
            .replicas
            .get_mut(replica)
            .ok_or(InvalidInput::UnknownReplica {
                replica,
                n_replicas,
            })?;
        if target.generations() >= expected {
            return Err(InvalidInput::IncompleteGeneration {
                replica,
                received: target.generations() + 1,
                expected,
            }
            .into());
        }
        target.ingest(segment)
    }

    /// Run the next evaluation.
    ///
    /// # Errors
    ///
    /// - [`InvalidInput::ConditionTerminated`] if already terminal.
    /// - [`InvalidInput::IncompleteGeneration`] unless every replica has
    ///   received the generation for this evaluation.
    pub fn evaluate(&mut self, config: &ControllerConfig) -> Result<Evaluation> {
        if self.is_terminal() {
            return Err(InvalidInput::ConditionTerminated(self.id.to_string()).into());
        }
        let expected = self.state.iteration() + 1;
        if let Some(replica) = self.replicas.iter().find(|r| r.generations() != expected) {
            return Err(InvalidInput::IncompleteGeneration {
                replica: replica.id(),
                received: replica.generations(),
                expected,
            }
            .into());
        }

        let evaluation = evaluate(self.id, self.state.iteration(), &self.replicas, config)?;
        for report in &evaluation.reports {
            self.replicas[report.replica].record(report);
        }
        self.state.record(&evaluation);
        if let StepResult::Decision(result) = &evaluation.outcome {
            self.result = Some(result.clone());
        }
        self.last_evaluation = Some(evaluation.clone());
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::ControllerPhase;
    use crate::error::Error;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn id() -> ConditionId {
        ConditionId::new(77.0, 5_000.0)
    }

    /// Random walk with strong upward drift; its back half is never flat.
    fn drifting(n: u64, start: f64) -> TimeSeries {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(start.to_bits());
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut level = start;
        let values = (0..n)
            .map(|_| {
                level += 1.0 + normal.sample(&mut rng);
                level
            })
            .collect();
        TimeSeries::new((0..n).map(|i| i * 10).collect(), values).unwrap()
    }

    fn flat_after_ramp() -> (TimeSeries, TimeSeries) {
        let ramp = TimeSeries::new((0..10).collect(), (0..10).map(|v| v as f64).collect()).unwrap();
        let flat = TimeSeries::new((0..10).map(|i| i * 7).collect(), vec![10.0; 10]).unwrap();
        (ramp, flat)
    }

    #[test]
    fn test_condition_id_order_and_display() {
        let a = ConditionId::new(300.0, 10.0);
        let b = ConditionId::new(300.0, 20.0);
        let c = ConditionId::new(250.0, 99.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(c.total_cmp(&a), Ordering::Less);
        assert_eq!(a.to_string(), "T=300K P=10Pa");
    }

    #[test]
    fn test_evaluate_requires_full_generation() {
        let mut condition = Condition::new(id(), 2);
        condition.ingest(0, &drifting(50, 0.0)).unwrap();
        let err = condition.evaluate(&ControllerConfig::new(2)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidInput(InvalidInput::IncompleteGeneration {
                replica: 1,
                received: 0,
                expected: 1
            })
        );
    }

    #[test]
    fn test_ingest_rejects_second_generation_before_evaluation() {
        let mut condition = Condition::new(id(), 1);
        condition.ingest(0, &drifting(50, 0.0)).unwrap();
        assert!(condition.ingest(0, &drifting(50, 0.0)).is_err());
    }

    #[test]
    fn test_ingest_unknown_replica() {
        let mut condition = Condition::new(id(), 1);
        assert_eq!(
            condition.ingest(3, &drifting(10, 0.0)).unwrap_err(),
            Error::InvalidInput(InvalidInput::UnknownReplica {
                replica: 3,
                n_replicas: 1
            })
        );
    }

    #[test]
    fn test_terminal_condition_rejects_evaluation() {
        let (ramp, flat) = flat_after_ramp();
        let mut condition = Condition::new(id(), 1);
        condition.ingest(0, &ramp.stitch(&flat).unwrap()).unwrap();
        let config = ControllerConfig::default();
        let evaluation = condition.evaluate(&config).unwrap();
        assert!(evaluation.outcome.is_decision());
        assert_eq!(condition.state().phase(), ControllerPhase::Converged);
        assert!(condition.result().unwrap().finished);

        assert!(matches!(
            condition.evaluate(&config),
            Err(Error::InvalidInput(InvalidInput::ConditionTerminated(_)))
        ));
        assert!(condition.ingest(0, &flat).is_err());
    }

    #[test]
    fn test_phase_progression_and_replica_bookkeeping() {
        let mut condition = Condition::new(id(), 1);
        let config = ControllerConfig::default().max_iterations(2);
        assert_eq!(condition.state().phase(), ControllerPhase::Init);

        condition.ingest(0, &drifting(200, 0.0)).unwrap();
        condition.evaluate(&config).unwrap();
        assert_eq!(condition.state().phase(), ControllerPhase::Iterating(1));
        assert_eq!(condition.replicas()[0].last_equilibration(), None);

        condition.ingest(0, &drifting(200, 200.0)).unwrap();
        let evaluation = condition.evaluate(&config).unwrap();
        assert_eq!(evaluation.iteration, 1);
        assert_eq!(condition.state().phase(), ControllerPhase::TimedOut);
        assert_eq!(condition.replicas()[0].generations(), 2);
        assert_eq!(condition.replicas()[0].series().len(), 400);
        assert_eq!(condition.state().g_history().len(), 2);
    }

    #[test]
    fn test_rebuild_matches_live_run() {
        let config = ControllerConfig::new(2).max_iterations(5);
        let generations: Vec<Vec<TimeSeries>> = (0..2)
            .map(|r| {
                (0..3)
                    .map(|g| drifting(100, (r * 1000 + g * 100) as f64))
                    .collect()
            })
            .collect();

        let mut live = Condition::new(id(), 2);
        for g in 0..3 {
            if live.is_terminal() {
                break;
            }
            for (r, segments) in generations.iter().enumerate() {
                live.ingest(r, &segments[g]).unwrap();
            }
            live.evaluate(&config).unwrap();
        }

        let mut rebuilt = Condition::rebuild(id(), &generations, &config).unwrap();
        if !rebuilt.is_terminal() {
            rebuilt.evaluate(&config).unwrap();
        }
        assert_eq!(rebuilt.state(), live.state());
        assert_eq!(rebuilt.replicas(), live.replicas());
        assert_eq!(rebuilt.last_evaluation(), live.last_evaluation());
        assert_eq!(rebuilt.result(), live.result());
    }

    #[test]
    fn test_rebuild_rejects_ragged_generations() {
        let generations = vec![vec![drifting(20, 0.0)], vec![]];
        assert!(matches!(
            Condition::rebuild(id(), &generations, &ControllerConfig::new(2)),
            Err(Error::InvalidInput(InvalidInput::IncompleteGeneration { replica: 1, .. }))
        ));
    }
}
