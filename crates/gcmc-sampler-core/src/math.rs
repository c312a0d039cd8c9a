//! Small numerical helpers shared by the statistics modules.

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Standard normal CDF: Φ(x) = (1 + erf(x/√2)) / 2
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x * core::f64::consts::FRAC_1_SQRT_2))
}

/// Evaluate a polynomial with coefficients in ascending order using Horner's rule.
#[inline]
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Arithmetic mean of a slice, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Linearly spaced values from `start` to `stop` inclusive.
///
/// A single point yields `[start]`; zero points yield an empty vector.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Values evenly spaced on a log10 scale from `start` to `stop` inclusive.
///
/// Both endpoints must be positive; callers validate this.
pub fn logspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    linspace(start.log10(), stop.log10(), count)
        .into_iter()
        .map(|e| libm::pow(10.0, e))
        .collect()
}
