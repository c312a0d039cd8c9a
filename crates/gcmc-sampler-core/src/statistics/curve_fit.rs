//! Least-squares fit of `exp(-x / tau)` to an autocorrelation curve.
//!
//! The single parameter is fitted in log space (`theta = ln tau`) with a
//! damped Gauss-Newton (Levenberg-Marquardt) iteration. Working in log space
//! keeps `tau` positive and makes the step size independent of its scale,
//! which matters because decay constants range over several decades.

use crate::constants::MAX_FIT_ITERATIONS;
use crate::error::{Error, InvalidInput, Result};
use crate::math::sq;

/// Largest change of `ln tau` accepted in one iteration.
const MAX_LOG_STEP: f64 = 2.0;

/// `|ln tau|` beyond this means the curve does not decay on any usable scale.
const LOG_TAU_BOUND: f64 = 50.0;

const LAMBDA_INITIAL: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e12;

/// Fitted decay constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFit {
    /// Decay constant in the units of `x`.
    pub tau: f64,
    /// Iterations used.
    pub iterations: usize,
    /// Residual sum of squares at the solution.
    pub residual_ss: f64,
}

fn divergence(iterations: usize, reason: &str) -> Error {
    Error::FitDivergence {
        iterations,
        reason: reason.to_string(),
    }
}

/// Fit `y ≈ exp(-x / tau)` starting from `tau_guess`.
///
/// # Errors
///
/// - [`InvalidInput`] for mismatched lengths, fewer than two points or a
///   non-positive guess.
/// - [`Error::FitDivergence`] when the iteration leaves the representable
///   range of `tau`, the curve carries no information about the decay, or
///   no convergence within the iteration limit.
pub fn fit_exponential_decay(x: &[f64], y: &[f64], tau_guess: f64) -> Result<ExponentialFit> {
    if x.len() != y.len() {
        return Err(InvalidInput::LengthMismatch {
            left: x.len(),
            right: y.len(),
        }
        .into());
    }
    if x.len() < 2 {
        return Err(InvalidInput::TooFewSamples {
            got: x.len(),
            min: 2,
        }
        .into());
    }
    if !(tau_guess > 0.0 && tau_guess.is_finite()) {
        return Err(InvalidInput::Config(format!("tau guess must be positive, got {tau_guess}")).into());
    }

    let cost = |theta: f64| -> f64 {
        let tau = theta.exp();
        x.iter()
            .zip(y)
            .map(|(&xi, &yi)| sq((-xi / tau).exp() - yi))
            .sum()
    };

    let mut theta = tau_guess.ln();
    let mut current = cost(theta);
    let mut lambda = LAMBDA_INITIAL;

    for iteration in 1..=MAX_FIT_ITERATIONS {
        let tau = theta.exp();
        let (mut gradient, mut hessian) = (0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y) {
            let model = (-xi / tau).exp();
            let jacobian = model * xi / tau;
            gradient += jacobian * (model - yi);
            hessian += jacobian * jacobian;
        }
        if !(hessian > 0.0 && hessian.is_finite() && gradient.is_finite()) {
            return Err(divergence(
                iteration,
                "autocorrelation carries no information about the decay",
            ));
        }

        loop {
            let step = (-gradient / (hessian * (1.0 + lambda))).clamp(-MAX_LOG_STEP, MAX_LOG_STEP);
            let candidate = theta + step;
            let trial = cost(candidate);

            if trial.is_finite() && trial <= current {
                let improvement = current - trial;
                theta = candidate;
                current = trial;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if theta.abs() > LOG_TAU_BOUND {
                    return Err(divergence(iteration, "decay constant left the representable range"));
                }
                if step.abs() < 1e-10 * (1.0 + theta.abs()) || improvement <= 1e-14 * current {
                    return Ok(ExponentialFit {
                        tau: theta.exp(),
                        iterations: iteration,
                        residual_ss: current,
                    });
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No damped step reduces the cost: theta is a local minimum.
                return Ok(ExponentialFit {
                    tau: theta.exp(),
                    iterations: iteration,
                    residual_ss: current,
                });
            }
        }
    }

    Err(divergence(MAX_FIT_ITERATIONS, "iteration limit reached"))
}
