//! Conditions sampled end to end through the driver loop.

use gcmc_sampler::{run_condition, ConditionId, ControllerConfig, ReplicaId};
use gcmc_sampler_core::{ContinuationReason, StepResult};

use crate::common::{controller, fast_simulator, Drifting, Recording};

#[test]
fn synthetic_condition_converges_near_plateau() {
    let sim = fast_simulator(11);
    let id = ConditionId::new(300.0, 1e4);
    let run = run_condition(&sim, id, &controller(2), 100_000).unwrap();

    assert!(run.result.finished, "result: {:?}", run.result);
    assert!(!run.result.timed_out);
    assert!(run.result.g > 5.0);
    assert!(run.evaluations.len() <= 4);

    let plateau = sim.model().plateau(id);
    let mean = run.result.mean.unwrap();
    assert!((mean - plateau).abs() < 0.1, "mean {mean} vs plateau {plateau}");
    assert!(run.result.std.unwrap() < 0.2);
}

#[test]
fn default_controller_converges() {
    let sim = fast_simulator(12);
    let id = ConditionId::new(300.0, 1e4);
    let run = run_condition(&sim, id, &ControllerConfig::default(), 100_000).unwrap();

    assert!(run.result.equilibrated && run.result.finished, "result: {:?}", run.result);
    let report = &run.evaluations.last().unwrap().reports[0];
    // The transient of the fast model lasts several relaxation times.
    let eq = report.equilibration_step.unwrap();
    assert!(eq > 2_000 && eq < 50_000, "equilibration at {eq}");

    let plateau = sim.model().plateau(id);
    let mean = run.result.mean.unwrap();
    assert!((mean - plateau).abs() < 0.1, "mean {mean} vs plateau {plateau}");
}

#[test]
fn never_equilibrating_condition_stops_at_iteration_budget() {
    let recorder = Recording::new(&Drifting);
    let config = controller(2).max_iterations(3);
    let run = run_condition(&recorder, ConditionId::new(250.0, 50.0), &config, 1_000).unwrap();

    assert_eq!(run.evaluations.len(), 3);
    assert!(run.result.timed_out);
    assert!(!run.result.finished);
    assert!(!run.result.equilibrated);
    assert_eq!(run.result.mean, None);
    assert_eq!(run.result.iterations, 3);

    // No generation beyond the budget: three generations per replica.
    let segments = recorder.segments.lock().unwrap();
    assert_eq!(segments.len(), 6);
    assert!(segments.iter().all(|(r, _)| r.generation < 3));
}

#[test]
fn unequilibrated_continuations_double_the_run() {
    let recorder = Recording::new(&Drifting);
    let config = controller(2).max_iterations(2);
    let run = run_condition(&recorder, ConditionId::new(250.0, 50.0), &config, 1_000).unwrap();

    let request = run.evaluations[0].outcome.continuation().unwrap();
    assert_eq!(request.reason, ContinuationReason::NotEquilibrated);
    // 100 samples every 10 steps: last step 990, doubled and split over two replicas.
    assert_eq!(request.total_steps, 1_980);
    let replicas: Vec<ReplicaId> = request.replicas.iter().map(|r| r.replica).collect();
    assert_eq!(replicas, vec![0, 1]);
    assert!(request.replicas.iter().all(|r| r.steps == 990 && r.generation == 1));
    assert!(matches!(run.evaluations[1].outcome, StepResult::Decision(_)));
}

#[test]
fn evaluations_are_numbered_and_last_one_decides() {
    let sim = fast_simulator(5);
    let run = run_condition(&sim, ConditionId::new(300.0, 2e3), &controller(1), 20_000).unwrap();

    for (i, evaluation) in run.evaluations.iter().enumerate() {
        assert_eq!(evaluation.iteration, i);
        assert_eq!(evaluation.reports.len(), 1);
        let is_last = i + 1 == run.evaluations.len();
        assert_eq!(evaluation.outcome.is_decision(), is_last);
    }
    assert_eq!(run.result.iterations, run.evaluations.len());
}
