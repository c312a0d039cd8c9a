//! Synthetic adsorption runs with known statistical properties.
//!
//! Each replica relaxes exponentially from `start` towards the Langmuir
//! loading of its condition and fluctuates around it with AR(1) noise of
//! known decorrelation length. Continuations pick up the process where the
//! previous generation stopped, so stitched generations look like one long
//! simulation.
//!
//! ```
//! use gcmc_sampler::{ConditionId, GenerationRequest, Simulator, SyntheticSimulator};
//!
//! let sim = SyntheticSimulator::langmuir(7);
//! let request = GenerationRequest {
//!     condition: ConditionId::new(300.0, 1e4),
//!     replica: 0,
//!     generation: 0,
//!     steps: 5_000,
//! };
//! let segment = sim.run(&request).unwrap();
//! assert_eq!(segment.first_step(), Some(0));
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use gcmc_sampler_core::{ConditionId, ReplicaId, TimeSeries};
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::runner::{GenerationRequest, Simulator};

/// Parameters of the generated loading curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticModel {
    /// Saturation loading.
    pub q_max: f64,
    /// Langmuir affinity (1/Pa) at `reference_temperature`.
    pub affinity: f64,
    pub reference_temperature: f64,
    /// Van 't Hoff slope (K): affinity grows as temperature drops.
    pub heat: f64,
    /// Loading at step 0.
    pub start: f64,
    /// Time constant of the approach to equilibrium, in steps.
    pub relax_steps: f64,
    /// Decorrelation length of the fluctuations, in steps.
    pub tau_steps: f64,
    /// Marginal standard deviation of the fluctuations.
    pub noise: f64,
    /// Steps between written samples.
    pub step_interval: u64,
}

impl Default for SyntheticModel {
    fn default() -> Self {
        Self {
            q_max: 10.0,
            affinity: 1e-4,
            reference_temperature: 300.0,
            heat: 2_000.0,
            start: 0.0,
            relax_steps: 20_000.0,
            tau_steps: 2_000.0,
            noise: 0.1,
            step_interval: 100,
        }
    }
}

impl SyntheticModel {
    /// Equilibrium loading at a condition.
    pub fn plateau(&self, condition: ConditionId) -> f64 {
        let k = self.affinity
            * (self.heat * (1.0 / condition.temperature - 1.0 / self.reference_temperature)).exp();
        let kp = k * condition.pressure;
        self.q_max * kp / (1.0 + kp)
    }

    fn mean_at(&self, plateau: f64, step: u64) -> f64 {
        plateau + (self.start - plateau) * (-(step as f64) / self.relax_steps).exp()
    }
}

#[derive(Debug, Clone, Copy)]
struct ReplicaProcess {
    next_generation: usize,
    elapsed: u64,
    fluctuation: f64,
}

type ProcessKey = (u64, u64, ReplicaId);

fn process_key(condition: ConditionId, replica: ReplicaId) -> ProcessKey {
    (
        condition.temperature.to_bits(),
        condition.pressure.to_bits(),
        replica,
    )
}

/// Deterministic [`Simulator`] driven by a [`SyntheticModel`].
#[derive(Debug)]
pub struct SyntheticSimulator {
    model: SyntheticModel,
    seed: u64,
    processes: Mutex<HashMap<ProcessKey, ReplicaProcess>>,
}

impl SyntheticSimulator {
    pub fn new(model: SyntheticModel, seed: u64) -> Self {
        Self {
            model,
            seed,
            processes: Mutex::new(HashMap::new()),
        }
    }

    /// Default Langmuir model.
    pub fn langmuir(seed: u64) -> Self {
        Self::new(SyntheticModel::default(), seed)
    }

    pub fn model(&self) -> &SyntheticModel {
        &self.model
    }

    fn generation_seed(&self, request: &GenerationRequest) -> u64 {
        let (t, p, replica) = process_key(request.condition, request.replica);
        self.seed
            ^ t.rotate_left(17)
            ^ p.rotate_left(41)
            ^ (replica as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (request.generation as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
    }

    fn failure(request: &GenerationRequest, message: impl Into<String>) -> WorkflowError {
        WorkflowError::Simulation {
            condition: request.condition,
            replica: request.replica,
            generation: request.generation,
            message: message.into(),
        }
    }
}

impl Simulator for SyntheticSimulator {
    fn run(&self, request: &GenerationRequest) -> Result<TimeSeries, WorkflowError> {
        let model = &self.model;
        if model.step_interval == 0 || request.steps == 0 {
            return Err(Self::failure(request, "step interval and step count must be positive"));
        }
        let key = process_key(request.condition, request.replica);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.generation_seed(request));

        let process = {
            let processes = self
                .processes
                .lock()
                .map_err(|_| Self::failure(request, "process table poisoned"))?;
            match (request.generation, processes.get(&key)) {
                (0, _) => ReplicaProcess {
                    next_generation: 0,
                    elapsed: 0,
                    fluctuation: StandardNormal.sample(&mut rng),
                },
                (g, Some(p)) if p.next_generation == g => *p,
                (g, found) => {
                    return Err(Self::failure(
                        request,
                        format!(
                            "generation {} requested, replica is at {}",
                            g,
                            found.map_or(0, |p| p.next_generation)
                        ),
                    ))
                }
            }
        };

        let interval = model.step_interval;
        let n = request.steps.div_ceil(interval);
        let phi = (-(interval as f64) / model.tau_steps).exp();
        let scale = (1.0 - phi * phi).sqrt();
        let plateau = model.plateau(request.condition);

        let mut fluctuation = process.fluctuation;
        let mut steps = Vec::with_capacity(n as usize);
        let mut values = Vec::with_capacity(n as usize);
        for i in 0..n {
            let offset = i * interval;
            if i > 0 {
                let shock: f64 = StandardNormal.sample(&mut rng);
                fluctuation = phi * fluctuation + scale * shock;
            }
            steps.push(offset);
            values.push(model.mean_at(plateau, process.elapsed + offset) + model.noise * fluctuation);
        }

        let shock: f64 = StandardNormal.sample(&mut rng);
        let next = ReplicaProcess {
            next_generation: request.generation + 1,
            elapsed: process.elapsed + n * interval,
            fluctuation: phi * fluctuation + scale * shock,
        };
        self.processes
            .lock()
            .map_err(|_| Self::failure(request, "process table poisoned"))?
            .insert(key, next);

        Ok(TimeSeries::new(steps, values)?)
    }
}
