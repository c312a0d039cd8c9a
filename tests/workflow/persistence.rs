//! Results files on disk and restoring a condition from them.

use std::path::{Path, PathBuf};

use gcmc_sampler::data::{load_generations, write_timeseries};
use gcmc_sampler::{
    rebuild_condition, resume_condition, run_condition, ConditionId, CsvResultsAdapter,
    SimulationAdapter,
};
use tempfile::TempDir;

use crate::common::{controller, fast_simulator, Recording, Refusing};

/// Lay out recorded generations as `<root>/r<replica>/g<generation>/results.csv`.
fn write_artifacts(
    root: &Path,
    adapter: &CsvResultsAdapter,
    recorder: &Recording<'_, gcmc_sampler::SyntheticSimulator>,
    n_replicas: usize,
) -> Vec<Vec<PathBuf>> {
    let mut artifacts = vec![Vec::new(); n_replicas];
    let segments = recorder.segments.lock().unwrap();
    let mut ordered: Vec<_> = segments.iter().collect();
    ordered.sort_by_key(|(request, _)| (request.replica, request.generation));
    for (request, segment) in ordered {
        let dir = root
            .join(format!("r{}", request.replica))
            .join(format!("g{}", request.generation));
        std::fs::create_dir_all(&dir).unwrap();
        write_timeseries(&adapter.results_path(&dir), segment, "loading").unwrap();
        artifacts[request.replica].push(dir);
    }
    artifacts
}

#[test]
fn restored_condition_reaches_the_same_decision() {
    let sim = fast_simulator(21);
    let recorder = Recording::new(&sim);
    let config = controller(2);
    let id = ConditionId::new(300.0, 1e4);
    let live = run_condition(&recorder, id, &config, 30_000).unwrap();

    let root = TempDir::new().unwrap();
    let adapter = CsvResultsAdapter::default();
    let artifacts = write_artifacts(root.path(), &adapter, &recorder, 2);
    assert!(artifacts.iter().all(|dirs| dirs.len() == live.evaluations.len()));

    let restored = rebuild_condition(&adapter, id, &artifacts, &config).unwrap();
    assert_eq!(restored.state().iteration(), live.evaluations.len() - 1);

    // The newest generation is only evaluated on resume; no new work is needed.
    let resumed = resume_condition(&Refusing, restored, &config).unwrap();
    assert_eq!(resumed.result, live.result);
    assert_eq!(resumed.evaluations.last(), live.evaluations.last());
}

#[test]
fn unfinished_generations_are_cut_before_rebuild() {
    let sim = fast_simulator(4);
    let recorder = Recording::new(&sim);
    let config = controller(2).max_iterations(2);
    let id = ConditionId::new(300.0, 1e3);
    run_condition(&recorder, id, &config, 3_000).unwrap();

    let root = TempDir::new().unwrap();
    let adapter = CsvResultsAdapter::default();
    let mut artifacts = write_artifacts(root.path(), &adapter, &recorder, 2);
    let pending = root.path().join("r1").join("pending");
    std::fs::create_dir_all(&pending).unwrap();
    artifacts[1].push(pending.clone());
    assert!(!adapter.check_finished(&pending).unwrap());

    let restored = rebuild_condition(&adapter, id, &artifacts, &config).unwrap();
    let depth = artifacts[0].len();
    assert!(restored.replicas().iter().all(|r| r.generations() == depth));
}

#[test]
fn generation_files_stitch_into_replica_series() {
    let sim = fast_simulator(9);
    let recorder = Recording::new(&sim);
    let config = controller(1).max_iterations(3);
    run_condition(&recorder, ConditionId::new(300.0, 5e2), &config, 2_000).unwrap();

    let root = TempDir::new().unwrap();
    let adapter = CsvResultsAdapter::default();
    let artifacts = write_artifacts(root.path(), &adapter, &recorder, 1);
    let files: Vec<PathBuf> = artifacts[0].iter().map(|d| adapter.results_path(d)).collect();
    let stitched = load_generations(&files).unwrap();

    let total: usize = recorder.segments.lock().unwrap().iter().map(|(_, s)| s.len()).sum();
    assert_eq!(stitched.len(), total);
    assert_eq!(stitched.step_interval(), Some(100));
    assert!(stitched.steps().windows(2).all(|w| w[1] - w[0] == 100));
}
