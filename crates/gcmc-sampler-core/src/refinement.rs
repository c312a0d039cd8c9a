//! Choosing new pressures where an isotherm changes fastest.
//!
//! The measured points split the pressure axis into intervals. New points
//! are handed out one at a time to the interval with the largest rise per
//! sub-interval, then spread evenly inside each interval.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInput, Result};

/// A span between two adjacent measured points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// Points allocated inside this interval so far.
    pub n_extra: usize,
}

impl Interval {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            x0,
            x1,
            y0,
            y1,
            n_extra: 0,
        }
    }

    /// Signed rise per sub-interval after the allocated points are inserted.
    pub fn delta(&self) -> f64 {
        (self.y1 - self.y0) / (1 + self.n_extra) as f64
    }

    /// Evenly spaced interior points, excluding both endpoints.
    pub fn new_points(&self) -> impl Iterator<Item = f64> + '_ {
        let width = (self.x1 - self.x0) / (1 + self.n_extra) as f64;
        (0..self.n_extra).map(move |i| self.x0 + width * (i + 1) as f64)
    }
}

/// Propose `n_new` new x positions given measured `(xs, ys)`.
///
/// Each new point goes to the interval with the largest [`Interval::delta`]
/// (the first such interval on ties). The result lists points interval by
/// interval in ascending order of x.
///
/// # Errors
///
/// [`InvalidInput`] for mismatched lengths, fewer than two points, or `xs`
/// that are not finite and strictly increasing.
pub fn propose_new_x(xs: &[f64], ys: &[f64], n_new: usize) -> Result<Vec<f64>> {
    if xs.len() != ys.len() {
        return Err(InvalidInput::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        }
        .into());
    }
    if xs.len() < 2 {
        return Err(InvalidInput::TooFewSamples {
            got: xs.len(),
            min: 2,
        }
        .into());
    }
    if let Some(index) = xs.iter().position(|x| !x.is_finite()) {
        return Err(InvalidInput::UnsortedAxis { index }.into());
    }
    if let Some(index) = xs.windows(2).position(|w| w[1] <= w[0]) {
        return Err(InvalidInput::UnsortedAxis { index: index + 1 }.into());
    }
    if let Some(index) = ys.iter().position(|y| !y.is_finite()) {
        return Err(InvalidInput::NonFinite { index }.into());
    }

    let mut intervals: Vec<Interval> = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| Interval::new(x[0], x[1], y[0], y[1]))
        .collect();

    for _ in 0..n_new {
        let mut best = 0;
        for (i, interval) in intervals.iter().enumerate().skip(1) {
            if interval.delta() > intervals[best].delta() {
                best = i;
            }
        }
        intervals[best].n_extra += 1;
    }

    Ok(intervals.iter().flat_map(Interval::new_points).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use proptest::prelude::*;

    fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len(), "{got:?} vs {want:?}");
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-12, "{got:?} vs {want:?}");
        }
    }

    #[test]
    fn test_steep_interval_gets_points() {
        let new = propose_new_x(&[0.0, 1.0, 2.0], &[0.0, 10.0, 11.0], 2).unwrap();
        // delta 10 -> 5 after the first point, still larger than 1
        assert_close(&new, &[1.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn test_flat_interval_gets_nothing() {
        let new = propose_new_x(&[0.0, 10.0, 20.0], &[1.0, 1.0, 5.0], 2).unwrap();
        assert_close(&new, &[40.0 / 3.0, 50.0 / 3.0]);
        assert!((new[0] - 13.33).abs() < 0.01);
        assert!((new[1] - 16.67).abs() < 0.01);
    }

    #[test]
    fn test_tie_goes_to_first_interval() {
        let new = propose_new_x(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], 1).unwrap();
        assert_close(&new, &[0.5]);
    }

    #[test]
    fn test_points_spread_across_intervals() {
        let new = propose_new_x(&[0.0, 10.0, 20.0], &[0.0, 4.0, 7.0], 3).unwrap();
        // 4 -> 2 after one point; then 3 > 2 wins; then 2 vs 1.5
        assert_close(&new, &[10.0 / 3.0, 20.0 / 3.0, 15.0]);
    }

    #[test]
    fn test_decreasing_data_uses_signed_delta() {
        // Falling intervals never win over a rising one.
        let new = propose_new_x(&[0.0, 1.0, 2.0], &[10.0, 0.0, 0.5], 2).unwrap();
        assert_close(&new, &[4.0 / 3.0, 5.0 / 3.0]);
    }

    #[test]
    fn test_zero_requested() {
        assert!(propose_new_x(&[0.0, 1.0], &[0.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            propose_new_x(&[0.0], &[1.0], 1),
            Err(Error::InvalidInput(InvalidInput::TooFewSamples { .. }))
        ));
        assert!(matches!(
            propose_new_x(&[0.0, 1.0], &[1.0], 1),
            Err(Error::InvalidInput(InvalidInput::LengthMismatch { .. }))
        ));
        assert!(matches!(
            propose_new_x(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0], 1),
            Err(Error::InvalidInput(InvalidInput::UnsortedAxis { index: 2 }))
        ));
        assert!(propose_new_x(&[0.0, f64::NAN], &[1.0, 2.0], 1).is_err());
    }

    fn sorted_points() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        prop::collection::vec((0.1f64..100.0, -50.0f64..50.0), 2..12).prop_map(|steps| {
            let mut x = 0.0;
            let (xs, ys) = steps
                .into_iter()
                .map(|(dx, y)| {
                    x += dx;
                    (x, y)
                })
                .unzip();
            (xs, ys)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn proposes_exactly_n_points_strictly_inside((xs, ys) in sorted_points(), n_new in 0usize..30) {
            let new = propose_new_x(&xs, &ys, n_new).unwrap();
            prop_assert_eq!(new.len(), n_new);
            let lo = xs[0];
            let hi = xs[xs.len() - 1];
            prop_assert!(new.iter().all(|&x| x > lo && x < hi));
            prop_assert!(new.iter().all(|x| !xs.contains(x)));
            prop_assert!(new.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
