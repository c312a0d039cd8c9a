//! Error types for the sampling core.
//!
//! Two failure modes are part of normal operation and are recoverable by
//! sampling longer: a series whose back half still drifts
//! ([`Error::NotEquilibrated`]) and an autocorrelation curve that the
//! exponential fit cannot describe ([`Error::FitDivergence`]). Everything
//! else is malformed input and is fatal for the invocation that saw it.

use thiserror::Error;

/// Result type used across the core crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the analysis routines and the controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The back half of the series is not flat; more sampling is needed.
    #[error("timeseries has not equilibrated: its back half is not flat")]
    NotEquilibrated,

    /// The exponential fit to the autocorrelation did not converge.
    #[error("exponential fit diverged after {iterations} iterations: {reason}")]
    FitDivergence {
        /// Iterations performed before giving up.
        iterations: usize,
        /// What went wrong.
        reason: String,
    },

    /// Malformed input or a contract violation by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

impl Error {
    /// Whether more sampling could make this error go away.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NotEquilibrated | Error::FitDivergence { .. })
    }
}

/// The ways input can be malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("need at least {min} samples, got {got}")]
    TooFewSamples { got: usize, min: usize },

    #[error("steps must be strictly increasing: step {current} at index {index} follows {previous}")]
    NonIncreasingSteps {
        index: usize,
        previous: u64,
        current: u64,
    },

    #[error("x values must be strictly increasing and finite (index {index})")]
    UnsortedAxis { index: usize },

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("equilibrated tail is empty")]
    EmptyTail,

    #[error("cannot infer the step interval of a series with fewer than two samples")]
    UnknownInterval,

    #[error("step counter overflowed while stitching generations")]
    StepOverflow,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("replica {replica} has {received} generations, expected {expected}")]
    IncompleteGeneration {
        replica: usize,
        received: usize,
        expected: usize,
    },

    #[error("replica {replica} does not exist (condition has {n_replicas})")]
    UnknownReplica { replica: usize, n_replicas: usize },

    #[error("condition {0} has already terminated")]
    ConditionTerminated(String),
}
