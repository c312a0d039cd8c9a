//! Statistical inefficiency of an equilibrated tail.
//!
//! The inefficiency `g` is the number of steps between effectively
//! independent samples. It is the decay constant of an exponential fitted to
//! the head of the sample autocorrelation, where lags are measured in steps
//! so that `g` does not depend on the sampling interval.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_ACF_CUTOFF, DEFAULT_MAX_LAG, DEFAULT_TAU_GUESS, MIN_INEFFICIENCY_SAMPLES};
use crate::error::{InvalidInput, Result};
use crate::statistics::{acf_fft, fit_exponential_decay};
use crate::timeseries::TimeSeries;

/// Tuning of the inefficiency estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InefficiencyConfig {
    /// Largest lag, in steps, included in the autocorrelation.
    pub max_lag: u64,
    /// The autocorrelation is truncated before it first drops below this.
    pub cutoff: f64,
    /// Starting decay constant for the fit, in steps.
    pub tau_guess: f64,
}

impl Default for InefficiencyConfig {
    fn default() -> Self {
        Self {
            max_lag: DEFAULT_MAX_LAG,
            cutoff: DEFAULT_ACF_CUTOFF,
            tau_guess: DEFAULT_TAU_GUESS,
        }
    }
}

impl InefficiencyConfig {
    pub fn max_lag(mut self, max_lag: u64) -> Self {
        self.max_lag = max_lag;
        self
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn tau_guess(mut self, tau_guess: f64) -> Self {
        self.tau_guess = tau_guess;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_lag == 0 {
            return Err(InvalidInput::Config("max_lag must be positive".into()).into());
        }
        if !(self.cutoff > 0.0 && self.cutoff < 1.0) {
            return Err(InvalidInput::Config(format!(
                "autocorrelation cutoff must lie in (0, 1), got {}",
                self.cutoff
            ))
            .into());
        }
        if !(self.tau_guess > 0.0 && self.tau_guess.is_finite()) {
            return Err(InvalidInput::Config(format!(
                "tau guess must be positive, got {}",
                self.tau_guess
            ))
            .into());
        }
        Ok(())
    }
}

/// Result of an inefficiency estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InefficiencyEstimate {
    /// Steps between independent samples, `tau` rounded to the nearest integer.
    pub g: u64,
    /// Fitted decay constant in steps.
    pub tau: f64,
    /// Number of autocorrelation lags computed.
    pub nlags: usize,
    /// Number of autocorrelation points the exponential was fitted to.
    pub fitted_points: usize,
}

/// Statistical inefficiency `g` of an equilibrated tail.
///
/// # Errors
///
/// - [`InvalidInput::EmptyTail`] for an empty tail and
///   [`InvalidInput::TooFewSamples`] for fewer than three samples.
/// - [`crate::Error::FitDivergence`] when the exponential fit fails.
pub fn estimate_g(tail: &TimeSeries, max_lag: u64, cutoff: f64) -> Result<u64> {
    let config = InefficiencyConfig::default().max_lag(max_lag).cutoff(cutoff);
    estimate_inefficiency(tail, &config).map(|estimate| estimate.g)
}

/// Full inefficiency estimate with the configured fit parameters.
///
/// A tail without any fluctuation is treated as perfectly decorrelated
/// (`g = 0`).
pub fn estimate_inefficiency(
    tail: &TimeSeries,
    config: &InefficiencyConfig,
) -> Result<InefficiencyEstimate> {
    if tail.is_empty() {
        return Err(InvalidInput::EmptyTail.into());
    }
    let n = tail.len();
    if n < MIN_INEFFICIENCY_SAMPLES {
        return Err(InvalidInput::TooFewSamples {
            got: n,
            min: MIN_INEFFICIENCY_SAMPLES,
        }
        .into());
    }

    let steps = tail.steps();
    let t0 = steps[0];
    let horizon = t0.saturating_add(config.max_lag);
    let nlags = steps.partition_point(|&s| s <= horizon).min(n - 1);

    if tail.summary().variance == 0.0 {
        debug!(n, "constant tail, no correlation to fit");
        return Ok(InefficiencyEstimate {
            g: 0,
            tau: 0.0,
            nlags,
            fitted_points: 0,
        });
    }

    let acf = acf_fft(tail.values(), nlags);
    let lags: Vec<f64> = steps[..acf.len()].iter().map(|&s| (s - t0) as f64).collect();

    // Keep the head of the curve before it first falls below the cutoff,
    // but always at least lag 0 and the first lag.
    let crossing = acf.iter().position(|&r| r < config.cutoff).unwrap_or(acf.len());
    let keep = crossing.max(2).min(acf.len());

    let fit = fit_exponential_decay(&lags[..keep], &acf[..keep], config.tau_guess)?;
    if !fit.tau.is_finite() {
        return Err(crate::Error::FitDivergence {
            iterations: fit.iterations,
            reason: "non-finite decay constant".into(),
        });
    }
    let g = fit.tau.round() as u64;
    debug!(nlags, fitted = keep, tau = fit.tau, g, "statistical inefficiency");

    Ok(InefficiencyEstimate {
        g,
        tau: fit.tau,
        nlags,
        fitted_points: keep,
    })
}
