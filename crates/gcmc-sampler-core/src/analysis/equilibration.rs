//! Equilibration detection.
//!
//! A series counts as equilibrated once its back half is flat, meaning the
//! augmented Dickey-Fuller test rejects a unit root. The equilibration point
//! is where the monotone (isotonic) envelope of the whole series first comes
//! within a few back-half standard deviations of its final value.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    DEFAULT_EQUILIBRATION_WIGGLES, DEFAULT_FLATNESS_SIGNIFICANCE, DEFAULT_MAX_FLATNESS_POINTS,
    MIN_EQUILIBRATION_SAMPLES,
};
use crate::error::{Error, InvalidInput, Result};
use crate::statistics::{adfuller, isotonic_increasing, RunningStats};
use crate::timeseries::TimeSeries;

/// Tuning of the equilibration detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibrationConfig {
    /// Back halves longer than this are decimated before the flatness test.
    pub max_flatness_points: usize,
    /// The back half is flat when the unit-root p-value is below this.
    pub significance: f64,
    /// Back-half standard deviations below the final envelope value that
    /// still count as equilibrated.
    pub wiggles: f64,
}

impl Default for EquilibrationConfig {
    fn default() -> Self {
        Self {
            max_flatness_points: DEFAULT_MAX_FLATNESS_POINTS,
            significance: DEFAULT_FLATNESS_SIGNIFICANCE,
            wiggles: DEFAULT_EQUILIBRATION_WIGGLES,
        }
    }
}

impl EquilibrationConfig {
    pub fn max_flatness_points(mut self, points: usize) -> Self {
        self.max_flatness_points = points;
        self
    }

    pub fn significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn wiggles(mut self, wiggles: f64) -> Self {
        self.wiggles = wiggles;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_flatness_points < MIN_EQUILIBRATION_SAMPLES {
            return Err(InvalidInput::Config(format!(
                "max_flatness_points must be at least {MIN_EQUILIBRATION_SAMPLES}, got {}",
                self.max_flatness_points
            ))
            .into());
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(InvalidInput::Config(format!(
                "significance must lie in (0, 1), got {}",
                self.significance
            ))
            .into());
        }
        if !(self.wiggles >= 0.0 && self.wiggles.is_finite()) {
            return Err(InvalidInput::Config(format!(
                "wiggles must be non-negative, got {}",
                self.wiggles
            ))
            .into());
        }
        Ok(())
    }
}

/// Where a series equilibrates, with the quantities that located it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibrationPoint {
    /// Step of the first equilibrated sample.
    pub step: u64,
    /// Index of the first equilibrated sample.
    pub index: usize,
    /// Envelope value that had to be reached.
    pub threshold: f64,
    /// Flatness p-value of the back half; `None` when the back half is constant.
    pub p_value: Option<f64>,
}

/// Step at which `series` equilibrates, with default tuning.
///
/// # Errors
///
/// - [`Error::NotEquilibrated`] if the back half is not flat.
/// - [`InvalidInput::TooFewSamples`] for series shorter than eight samples.
pub fn find_equilibration(series: &TimeSeries) -> Result<u64> {
    detect_equilibration(series, &EquilibrationConfig::default()).map(|point| point.step)
}

/// Locate the equilibration point of `series`.
pub fn detect_equilibration(
    series: &TimeSeries,
    config: &EquilibrationConfig,
) -> Result<EquilibrationPoint> {
    let n = series.len();
    if n < MIN_EQUILIBRATION_SAMPLES {
        return Err(InvalidInput::TooFewSamples {
            got: n,
            min: MIN_EQUILIBRATION_SAMPLES,
        }
        .into());
    }

    let values = series.values();
    let back_start = series.back_half_start();
    let back = &values[back_start..];
    let back_std = back.iter().copied().collect::<RunningStats>().finalize().std();

    if back_std == 0.0 {
        debug!(step = series.steps()[back_start], "constant back half");
        return Ok(EquilibrationPoint {
            step: series.steps()[back_start],
            index: back_start,
            threshold: back[0],
            p_value: None,
        });
    }

    let flatness = adfuller(&decimate(back, config.max_flatness_points)).ok_or(Error::NotEquilibrated)?;
    debug!(
        statistic = flatness.statistic,
        p_value = flatness.p_value,
        lag = flatness.used_lag,
        "back-half flatness"
    );
    if !(flatness.p_value < config.significance) {
        return Err(Error::NotEquilibrated);
    }

    let envelope = isotonic_increasing(values);
    let threshold = envelope[n - 1] - config.wiggles * back_std;
    let index = envelope.iter().position(|&v| v >= threshold).unwrap_or(n - 1);

    Ok(EquilibrationPoint {
        step: series.steps()[index],
        index,
        threshold,
        p_value: Some(flatness.p_value),
    })
}

/// Keep every `len / max_points`-th value when there are more than `max_points`.
fn decimate(values: &[f64], max_points: usize) -> Cow<'_, [f64]> {
    if values.len() <= max_points || max_points == 0 {
        return Cow::Borrowed(values);
    }
    let stride = values.len() / max_points;
    Cow::Owned(values.iter().step_by(stride).copied().collect())
}
