//! Default values and fixed numerical constants used throughout the crate.

// =============================================================================
// Controller defaults
// =============================================================================

/// Default required number of independent samples summed over all replicas.
pub const DEFAULT_G_REQ: f64 = 5.0;

/// Default maximum number of controller invocations per condition.
pub const DEFAULT_MAX_ITERATIONS: usize = 4;

/// Default number of independent replicas per condition.
pub const DEFAULT_N_PARALLEL: usize = 1;

// =============================================================================
// Statistical inefficiency defaults
// =============================================================================

/// Default maximum lag, in simulation steps, considered for the autocorrelation.
pub const DEFAULT_MAX_LAG: u64 = 5_000_000;

/// Default autocorrelation cutoff; the curve is truncated before it first drops below this.
pub const DEFAULT_ACF_CUTOFF: f64 = 0.1;

/// Initial guess for the decay constant (in steps) of the exponential fit.
pub const DEFAULT_TAU_GUESS: f64 = 10_000.0;

/// Maximum number of Levenberg-Marquardt iterations for the exponential fit.
pub const MAX_FIT_ITERATIONS: usize = 400;

/// Minimum number of samples in an equilibrated tail for an inefficiency estimate.
pub const MIN_INEFFICIENCY_SAMPLES: usize = 3;

// =============================================================================
// Equilibration defaults
// =============================================================================

/// Back halves longer than this are decimated before the flatness test.
pub const DEFAULT_MAX_FLATNESS_POINTS: usize = 10_000;

/// Significance level of the flatness (unit-root) test.
pub const DEFAULT_FLATNESS_SIGNIFICANCE: f64 = 0.05;

/// Number of back-half standard deviations below the final envelope value
/// at which the series counts as equilibrated.
pub const DEFAULT_EQUILIBRATION_WIGGLES: f64 = 2.0;

/// Fewer samples than this leave the unit-root regression without degrees of freedom.
pub const MIN_EQUILIBRATION_SAMPLES: usize = 8;

/// Shortest replica series the controller accepts; anything shorter is a
/// broken pipeline rather than a run that needs more steps.
pub const MIN_REPLICA_SAMPLES: usize = 2;

// =============================================================================
// MacKinnon (1994) approximate p-value coefficients
// =============================================================================
//
// Constant-only regression with a single series.

/// Statistics above this have p-value 1.
pub const MACKINNON_TAU_MAX: f64 = 2.74;

/// Statistics below this have p-value 0.
pub const MACKINNON_TAU_MIN: f64 = -18.83;

/// Boundary between the small-p and large-p polynomial.
pub const MACKINNON_TAU_STAR: f64 = -1.61;

/// Polynomial coefficients (ascending order) for statistics at or below the boundary.
pub const MACKINNON_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];

/// Polynomial coefficients (ascending order) for statistics above the boundary.
pub const MACKINNON_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Natural log of 2*pi, used in the Gaussian log-likelihood of the lag selection.
pub const LOG_2PI: f64 = 1.8378770664093453;
