//! Streaming mean and variance using Welford's algorithm.

/// Running mean/variance accumulator.
///
/// # Example
///
/// ```
/// use gcmc_sampler_core::statistics::RunningStats;
///
/// let stats: RunningStats = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
/// let snapshot = stats.finalize();
/// assert!((snapshot.mean - 3.0).abs() < 1e-10);
/// assert!((snapshot.variance - 2.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    /// Sum of squared deviations from the current mean.
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Snapshot of the accumulated moments.
    ///
    /// Variance uses `count - 1` in the denominator and is zero with fewer
    /// than two observations.
    pub fn finalize(&self) -> StatsSnapshot {
        let variance = if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0)
        };
        StatsSnapshot {
            mean: self.mean,
            variance,
            count: self.count,
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

/// Moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsSnapshot {
    pub mean: f64,
    /// Sample variance (ddof = 1).
    pub variance: f64,
    pub count: usize,
}

impl StatsSnapshot {
    /// Sample standard deviation.
    pub fn std(&self) -> f64 {
        self.variance.sqrt()
    }
}
