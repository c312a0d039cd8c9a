//! Whole workflows: first round, refinement round, report.

use gcmc_sampler::{
    output, run_isotherm, ConditionSpec, PressureGrid, Quantity, Spacing, WorkflowConfig,
};
use gcmc_sampler_core::EquilibrationConfig;

use crate::common::{fast_model, fast_simulator, Drifting};

fn adaptive_workflow(count: usize) -> WorkflowConfig {
    WorkflowConfig {
        name: "synthetic".to_string(),
        conditions: vec![ConditionSpec {
            temperatures: vec![300.0],
            pressures: PressureGrid::Adaptive {
                start: "1k".parse().unwrap(),
                stop: "1M".parse().unwrap(),
                count,
                spacing: Spacing::Logarithmic,
            },
        }],
        n_parallel: 2,
        initial_steps: Quantity::new(100_000.0).unwrap(),
        equilibration: EquilibrationConfig::default().wiggles(4.0),
        ..WorkflowConfig::default()
    }
}

#[test]
fn adaptive_grid_is_refined_between_first_round_points() {
    let config = adaptive_workflow(5);
    let run = run_isotherm(&fast_simulator(3), &config).unwrap();

    assert_eq!(run.runs.len(), 5);
    assert_eq!(run.isotherm.len(), 5);
    let pressures: Vec<f64> = run
        .isotherm
        .points()
        .iter()
        .map(|p| p.condition.pressure)
        .collect();
    assert!((pressures[0] - 1e3).abs() < 1e-9);
    assert!((pressures[4] - 1e6).abs() < 1e-6);
    assert!((pressures[2] - 500_500.0).abs() < 1e-3);
    assert!(pressures.windows(2).all(|w| w[0] < w[1]));

    // Langmuir loading rises with pressure.
    let model = fast_model();
    for point in run.isotherm.points() {
        let mean = point.result.mean.unwrap();
        let plateau = model.plateau(point.condition);
        assert!((mean - plateau).abs() < 0.15, "{}: {} vs {}", point.condition, mean, plateau);
    }
}

#[test]
fn fixed_grid_runs_every_temperature() {
    let config = WorkflowConfig {
        conditions: vec![ConditionSpec {
            temperatures: vec![280.0, 320.0],
            pressures: PressureGrid::Explicit {
                values: vec!["5k".parse().unwrap(), "20k".parse().unwrap()],
            },
        }],
        ..adaptive_workflow(4)
    };
    let run = run_isotherm(&fast_simulator(8), &config).unwrap();

    assert_eq!(run.isotherm.temperatures(), vec![280.0, 320.0]);
    assert_eq!(run.isotherm.len(), 4);
    let csv = run.isotherm.to_csv();
    assert!(csv.starts_with("temperature,pressure,mean,std,g,equilibrated,finished,timed_out\n"));
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.lines().nth(1).unwrap().starts_with("280,5000,"));
}

#[test]
fn refinement_is_skipped_without_usable_means() {
    let config = WorkflowConfig {
        max_iterations: 2,
        initial_steps: Quantity::new(1_000.0).unwrap(),
        ..adaptive_workflow(6)
    };
    let run = run_isotherm(&Drifting, &config).unwrap();

    assert_eq!(run.isotherm.len(), 3);
    assert_eq!(run.isotherm.converged(), 0);
    assert!(run.isotherm.points().iter().all(|p| p.result.timed_out));
}

#[test]
fn run_reports_serialize() {
    let config = WorkflowConfig {
        conditions: vec![ConditionSpec {
            temperatures: vec![300.0],
            pressures: PressureGrid::Explicit {
                values: vec!["10k".parse().unwrap()],
            },
        }],
        ..adaptive_workflow(2)
    };
    let run = run_isotherm(&fast_simulator(1), &config).unwrap();

    let json = output::to_json(&run).unwrap();
    assert!(json.contains("\"evaluations\""));
    assert!(json.contains("\"reports\""));

    colored::control::set_override(false);
    let table = output::format_isotherm(&run.isotherm);
    assert!(table.contains("Isotherm (1 points"));
    let last = run.runs[0].evaluations.last().unwrap();
    assert!(output::format_evaluation(last).contains("replica 1"));
}
