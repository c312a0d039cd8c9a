//! Shared simulators for the workflow tests.

use std::sync::Mutex;

use gcmc_sampler::{
    ControllerConfig, GenerationRequest, Simulator, SyntheticModel, SyntheticSimulator,
    TimeSeries, WorkflowError,
};
use gcmc_sampler_core::analysis::EquilibrationConfig;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Relaxes within a few thousand steps, decorrelates within a few hundred.
pub fn fast_model() -> SyntheticModel {
    SyntheticModel {
        relax_steps: 2_000.0,
        tau_steps: 500.0,
        noise: 0.05,
        step_interval: 100,
        ..SyntheticModel::default()
    }
}

pub fn fast_simulator(seed: u64) -> SyntheticSimulator {
    SyntheticSimulator::new(fast_model(), seed)
}

/// Controller tuned for the fast model's noise level.
pub fn controller(n_parallel: usize) -> ControllerConfig {
    ControllerConfig::new(n_parallel).equilibration(EquilibrationConfig::default().wiggles(4.0))
}

/// Every generation is a steeply drifting random walk starting far above
/// the previous one, so no replica ever equilibrates.
pub struct Drifting;

impl Simulator for Drifting {
    fn run(&self, request: &GenerationRequest) -> Result<TimeSeries, WorkflowError> {
        let seed = ((request.replica as u64) << 32) | request.generation as u64;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let n = (request.steps / 10).max(1);
        let mut level = 1e6 * request.generation as f64;
        let values = (0..n)
            .map(|_| {
                level += 1.0 + normal.sample(&mut rng);
                level
            })
            .collect();
        Ok(TimeSeries::new((0..n).map(|i| i * 10).collect(), values)?)
    }
}

/// Wraps a simulator and keeps every segment it produced.
pub struct Recording<'a, S> {
    pub inner: &'a S,
    pub segments: Mutex<Vec<(GenerationRequest, TimeSeries)>>,
}

impl<'a, S> Recording<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self {
            inner,
            segments: Mutex::new(Vec::new()),
        }
    }
}

impl<S: Simulator> Simulator for Recording<'_, S> {
    fn run(&self, request: &GenerationRequest) -> Result<TimeSeries, WorkflowError> {
        let segment = self.inner.run(request)?;
        self.segments.lock().unwrap().push((*request, segment.clone()));
        Ok(segment)
    }
}

/// Fails every request; proves that no new generation was issued.
pub struct Refusing;

impl Simulator for Refusing {
    fn run(&self, request: &GenerationRequest) -> Result<TimeSeries, WorkflowError> {
        Err(WorkflowError::Simulation {
            condition: request.condition,
            replica: request.replica,
            generation: request.generation,
            message: "no more generations expected".to_string(),
        })
    }
}
