//! Validated `(step, value)` timeseries and generation stitching.
//!
//! A simulation writes one series per generation, each with steps starting
//! from zero. Stitching shifts a continuation so that its first sample
//! follows the previous generation's last sample by one sampling interval,
//! producing a single series with strictly increasing steps.

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInput, Result};
use crate::statistics::{RunningStats, StatsSnapshot};

/// A single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation step (cycle) at which the value was recorded.
    pub step: u64,
    /// Observed value, e.g. molecules adsorbed per unit cell.
    pub value: f64,
}

/// An ordered series of samples with strictly increasing steps and finite values.
///
/// Steps and values are stored as parallel vectors so the analysis routines
/// can borrow plain slices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct TimeSeries {
    steps: Vec<u64>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, validating ordering and finiteness.
    pub fn new(steps: Vec<u64>, values: Vec<f64>) -> Result<Self> {
        if steps.len() != values.len() {
            return Err(InvalidInput::LengthMismatch {
                left: steps.len(),
                right: values.len(),
            }
            .into());
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(InvalidInput::NonFinite { index }.into());
        }
        if let Some(index) = steps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(InvalidInput::NonIncreasingSteps {
                index: index + 1,
                previous: steps[index],
                current: steps[index + 1],
            }
            .into());
        }
        Ok(Self { steps, values })
    }

    /// Build a series from samples in order.
    pub fn from_samples<I: IntoIterator<Item = Sample>>(samples: I) -> Result<Self> {
        let (steps, values) = samples.into_iter().map(|s| (s.step, s.value)).unzip();
        Self::new(steps, values)
    }

    /// A series with no samples.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[u64] {
        &self.steps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sample at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            step: *self.steps.get(index)?,
            value: self.values[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.steps
            .iter()
            .zip(&self.values)
            .map(|(&step, &value)| Sample { step, value })
    }

    pub fn first_step(&self) -> Option<u64> {
        self.steps.first().copied()
    }

    pub fn last_step(&self) -> Option<u64> {
        self.steps.last().copied()
    }

    /// Steps covered from the first to the last sample; zero when empty.
    pub fn span(&self) -> u64 {
        match (self.first_step(), self.last_step()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// Sampling interval inferred from the first two samples.
    pub fn step_interval(&self) -> Option<u64> {
        match self.steps.as_slice() {
            [a, b, ..] => Some(b - a),
            _ => None,
        }
    }

    /// Index of the first sample recorded at or after `step`.
    pub fn index_at_or_after(&self, step: u64) -> usize {
        self.steps.partition_point(|&s| s < step)
    }

    /// Samples from `step` (inclusive) to the end.
    pub fn slice_from_step(&self, step: u64) -> TimeSeries {
        self.slice_from_index(self.index_at_or_after(step))
    }

    /// Samples from `index` to the end. An index past the end yields an empty series.
    pub fn slice_from_index(&self, index: usize) -> TimeSeries {
        let index = index.min(self.len());
        TimeSeries {
            steps: self.steps[index..].to_vec(),
            values: self.values[index..].to_vec(),
        }
    }

    /// Index where the back half begins: the last `len / 2` samples.
    pub fn back_half_start(&self) -> usize {
        self.len() - self.len() / 2
    }

    /// Mean, sample variance and count of the values.
    pub fn summary(&self) -> StatsSnapshot {
        self.values.iter().copied().collect::<RunningStats>().finalize()
    }

    /// Arithmetic mean, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.summary().mean)
    }

    /// Sample standard deviation (ddof = 1), `None` with fewer than two samples.
    pub fn std(&self) -> Option<f64> {
        (self.len() >= 2).then(|| self.summary().std())
    }

    /// Number of samples that are at least `g` steps apart, counted from the first step.
    ///
    /// With `g == 0` every sample is independent.
    pub fn independent_samples(&self, g: u64) -> u64 {
        if g == 0 {
            return self.len() as u64;
        }
        self.span() / g
    }

    /// Append a continuation generation, shifting its steps to follow this series.
    ///
    /// See [`TimeSeries::stitch`] for the offset rule.
    pub fn append(&mut self, next: &TimeSeries) -> Result<()> {
        if next.is_empty() {
            return Ok(());
        }
        let Some(last) = self.last_step() else {
            *self = next.clone();
            return Ok(());
        };
        let interval = self
            .step_interval()
            .or_else(|| next.step_interval())
            .ok_or(Error::InvalidInput(InvalidInput::UnknownInterval))?;
        let offset = last
            .checked_add(interval)
            .ok_or(InvalidInput::StepOverflow)?;
        // Shift everything before touching `self` so a failure leaves it intact.
        let shifted = next
            .steps
            .iter()
            .map(|&step| step.checked_add(offset).ok_or(InvalidInput::StepOverflow))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.steps.extend(shifted);
        self.values.extend_from_slice(&next.values);
        Ok(())
    }

    /// Stitch `next` onto this series.
    ///
    /// The continuation's steps are offset by `self.last_step() + interval`,
    /// where `interval` is this series' first two-sample spacing, or the
    /// continuation's when this series has a single sample. An empty series
    /// on either side is the identity.
    pub fn stitch(&self, next: &TimeSeries) -> Result<TimeSeries> {
        let mut out = self.clone();
        out.append(next)?;
        Ok(out)
    }

    /// Stitch an ordered list of generations into one series.
    pub fn stitch_all<'a, I>(generations: I) -> Result<TimeSeries>
    where
        I: IntoIterator<Item = &'a TimeSeries>,
    {
        let mut out = TimeSeries::empty();
        for generation in generations {
            out.append(generation)?;
        }
        Ok(out)
    }
}

impl TryFrom<Vec<Sample>> for TimeSeries {
    type Error = Error;

    fn try_from(samples: Vec<Sample>) -> Result<Self> {
        Self::from_samples(samples)
    }
}

impl From<TimeSeries> for Vec<Sample> {
    fn from(series: TimeSeries) -> Self {
        series.iter().collect()
    }
}
