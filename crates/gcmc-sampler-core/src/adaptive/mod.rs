//! Per-condition sampling controller.
//!
//! A [`Condition`] owns its replicas' stitched series and an
//! [`IterationState`]. Each call to [`Condition::evaluate`] runs [`evaluate`]
//! over the replicas and returns either a final
//! [`ConditionResult`](crate::ConditionResult) or a
//! [`ContinuationRequest`](crate::ContinuationRequest) sized to reach the
//! required number of independent samples.
//!
//! # Usage Pattern
//!
//! ```ignore
//! let mut condition = Condition::new(id, config.n_parallel);
//! for (replica, segment) in first_generation {
//!     condition.ingest(replica, &segment)?;
//! }
//! loop {
//!     match condition.evaluate(&config)?.outcome {
//!         StepResult::Decision(result) => return Ok(result),
//!         StepResult::Continue(request) => {
//!             for continuation in &request.replicas {
//!                 let segment = simulate(continuation)?;
//!                 condition.ingest(continuation.replica, &segment)?;
//!             }
//!         }
//!     }
//! }
//! ```

mod condition;
mod config;
mod state;
mod step;

pub use condition::{Condition, ConditionId, Replica, ReplicaId};
pub use config::ControllerConfig;
pub use state::{ControllerPhase, IterationState};
pub use step::{evaluate, Evaluation, StepResult, Verdict};
