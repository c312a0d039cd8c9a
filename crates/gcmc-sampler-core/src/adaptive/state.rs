//! Controller progress for one condition.
//!
//! The state is fully determined by the sequence of evaluations applied to
//! it, so replaying the persisted generations through a fresh
//! [`Condition`](super::Condition) reproduces it exactly.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::step::Evaluation;

/// Where a condition is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// No evaluation has run yet.
    Init,
    /// Waiting for the generation consumed by evaluation `i`.
    Iterating(usize),
    /// Enough independent samples were collected.
    Converged,
    /// The iteration limit was reached.
    TimedOut,
}

impl ControllerPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ControllerPhase::Converged | ControllerPhase::TimedOut)
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerPhase::Init => write!(f, "init"),
            ControllerPhase::Iterating(i) => write!(f, "iterating ({i})"),
            ControllerPhase::Converged => write!(f, "converged"),
            ControllerPhase::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Progress of the controller for one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationState {
    phase: ControllerPhase,

    /// Evaluations performed so far; also the index of the next one.
    iteration: usize,

    /// Independent-sample count from the latest evaluation.
    g_total: f64,

    /// Per-replica equilibration flags from the latest evaluation.
    equilibrated: Vec<bool>,

    /// `g_total` after each evaluation.
    g_history: Vec<f64>,
}

impl IterationState {
    pub fn new(n_replicas: usize) -> Self {
        Self {
            phase: ControllerPhase::Init,
            iteration: 0,
            g_total: 0.0,
            equilibrated: vec![false; n_replicas],
            g_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn g_total(&self) -> f64 {
        self.g_total
    }

    pub fn equilibrated(&self) -> &[bool] {
        &self.equilibrated
    }

    pub fn all_equilibrated(&self) -> bool {
        self.equilibrated.iter().all(|&e| e)
    }

    pub fn g_history(&self) -> &[f64] {
        &self.g_history
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Apply an evaluation and advance the phase.
    pub(crate) fn record(&mut self, evaluation: &Evaluation) {
        self.g_total = evaluation.verdict.g_total;
        self.equilibrated = evaluation
            .reports
            .iter()
            .map(|report| report.is_equilibrated())
            .collect();
        self.g_history.push(evaluation.verdict.g_total);
        self.iteration = evaluation.iteration + 1;
        self.phase = if evaluation.verdict.finished {
            ControllerPhase::Converged
        } else if evaluation.verdict.timed_out {
            ControllerPhase::TimedOut
        } else {
            ControllerPhase::Iterating(self.iteration)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = IterationState::new(3);
        assert_eq!(state.phase(), ControllerPhase::Init);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.equilibrated(), &[false, false, false]);
        assert!(!state.all_equilibrated());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(ControllerPhase::Converged.is_terminal());
        assert!(ControllerPhase::TimedOut.is_terminal());
        assert!(!ControllerPhase::Iterating(2).is_terminal());
        assert!(!ControllerPhase::Init.is_terminal());
        assert_eq!(ControllerPhase::Iterating(2).to_string(), "iterating (2)");
    }
}
