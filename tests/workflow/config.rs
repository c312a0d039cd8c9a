//! Workflow descriptions read from JSON.

use std::io::Write;

use gcmc_sampler::{PressureGrid, Spacing, WorkflowConfig, WorkflowError};
use tempfile::NamedTempFile;

const WORKFLOW: &str = r#"{
    "name": "IRMOF-1 methane",
    "conditions": [
        { "temperatures": [208, 298],
          "pressures": { "kind": "adaptive", "start": "1k", "stop": "5M", "count": 12 } },
        { "temperatures": [150],
          "pressures": { "kind": "explicit", "values": ["10k", 25000, "0.1M"] } }
    ],
    "n_parallel": 3,
    "initial_steps": "20k",
    "g_req": 8.0,
    "max_iterations": 6,
    "inefficiency": { "max_lag": 100000 }
}"#;

#[test]
fn workflow_file_is_parsed() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(WORKFLOW.as_bytes()).unwrap();
    let config = WorkflowConfig::from_path(file.path()).unwrap();

    assert_eq!(config.name, "IRMOF-1 methane");
    assert_eq!(config.initial_steps().unwrap(), 20_000);

    let controller = config.controller_config();
    assert_eq!(controller.n_parallel, 3);
    assert_eq!(controller.g_req, 8.0);
    assert_eq!(controller.max_iterations, 6);
    assert_eq!(controller.inefficiency.max_lag, 100_000);
    assert_eq!(controller.inefficiency.cutoff, 0.1);

    match &config.conditions[0].pressures {
        PressureGrid::Adaptive { spacing, count, .. } => {
            assert_eq!(*spacing, Spacing::Logarithmic);
            assert_eq!(*count, 12);
        }
        other => panic!("expected adaptive grid, got {:?}", other),
    }
}

#[test]
fn grid_plans_cover_every_temperature() {
    let config = WorkflowConfig::from_json_str(WORKFLOW).unwrap();
    let plans = config.grid_plans();

    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0].pressures.len(), 6);
    assert_eq!(plans[0].refine, 6);
    assert_eq!(plans[2].temperature, 150.0);
    assert_eq!(plans[2].pressures, vec![10_000.0, 25_000.0, 100_000.0]);
    assert_eq!(plans[2].refine, 0);
}

#[test]
fn unknown_suffix_is_rejected() {
    let json = WORKFLOW.replace("\"5M\"", "\"5G\"");
    assert!(matches!(
        WorkflowConfig::from_json_str(&json),
        Err(WorkflowError::Json(_))
    ));
}

#[test]
fn invalid_controller_settings_are_rejected() {
    let json = WORKFLOW.replace("\"n_parallel\": 3", "\"n_parallel\": 0");
    assert!(matches!(
        WorkflowConfig::from_json_str(&json),
        Err(WorkflowError::Sampling(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        WorkflowConfig::from_path("/nonexistent/workflow.json"),
        Err(WorkflowError::Io(_))
    ));
}
