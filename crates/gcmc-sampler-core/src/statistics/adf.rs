//! Augmented Dickey-Fuller unit-root test with a constant term.
//!
//! The lag order is chosen by AIC over a common estimation sample, then the
//! regression is re-run on the largest sample available for that lag. The
//! p-value uses MacKinnon's (1994) polynomial approximation for the
//! constant-only case with one series.

use nalgebra::{DMatrix, DVector};

use crate::constants::{
    LOG_2PI, MACKINNON_LARGE_P, MACKINNON_SMALL_P, MACKINNON_TAU_MAX, MACKINNON_TAU_MIN,
    MACKINNON_TAU_STAR,
};
use crate::math::{normal_cdf, polyval};

/// Outcome of the unit-root test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    /// Approximate p-value; small values reject the unit root.
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub n_obs: usize,
}

struct OlsFit {
    beta: DVector<f64>,
    ssr: f64,
    /// (X'X)^-1
    xtx_inv: DMatrix<f64>,
    n_obs: usize,
}

impl OlsFit {
    fn aic(&self) -> f64 {
        let n = self.n_obs as f64;
        let k = self.beta.len() as f64;
        n * (LOG_2PI + (self.ssr / n).ln() + 1.0) + 2.0 * k
    }

    fn t_value(&self, index: usize) -> f64 {
        let dof = (self.n_obs - self.beta.len()) as f64;
        let se = (self.ssr / dof * self.xtx_inv[(index, index)]).sqrt();
        self.beta[index] / se
    }
}

fn ols(design: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    if design.nrows() <= design.ncols() {
        return None;
    }
    let xt = design.transpose();
    let xtx_inv = (&xt * design).cholesky()?.inverse();
    let beta = &xtx_inv * (&xt * y);
    let ssr = (y - design * &beta).norm_squared();
    Some(OlsFit {
        beta,
        ssr,
        xtx_inv,
        n_obs: design.nrows(),
    })
}

/// Regression of `xdiff[t]` on `[1, x[t], xdiff[t-1], ..., xdiff[t-lags]]`
/// for `t` in `first_row..xdiff.len()`.
fn design(x: &[f64], xdiff: &[f64], lags: usize, first_row: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = xdiff.len() - first_row;
    let cols = 2 + lags;
    let matrix = DMatrix::from_fn(rows, cols, |r, c| {
        let t = first_row + r;
        match c {
            0 => 1.0,
            1 => x[t],
            lag => xdiff[t - (lag - 1)],
        }
    });
    let y = DVector::from_iterator(rows, xdiff[first_row..].iter().copied());
    (matrix, y)
}

/// Run the test on `x`.
///
/// Returns `None` when the series is too short for any lag order or the
/// regression is singular or yields a non-finite statistic.
pub fn adfuller(x: &[f64]) -> Option<AdfResult> {
    let n = x.len();
    let cap = (n / 2).checked_sub(2)?;
    let default_maxlag = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let maxlag = default_maxlag.min(cap);

    let xdiff: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Lag selection on the common sample starting at `maxlag`.
    let mut best: Option<(f64, usize)> = None;
    for lags in 0..=maxlag {
        let (matrix, y) = design(x, &xdiff, lags, maxlag);
        let Some(fit) = ols(&matrix, &y) else {
            continue;
        };
        let aic = fit.aic();
        if best.map_or(!aic.is_nan(), |(b, _)| aic < b) {
            best = Some((aic, lags));
        }
    }
    let (_, used_lag) = best?;

    let (matrix, y) = design(x, &xdiff, used_lag, used_lag);
    let fit = ols(&matrix, &y)?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return None;
    }

    Some(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        n_obs: fit.n_obs,
    })
}

/// MacKinnon approximate p-value for the constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic > MACKINNON_TAU_MAX {
        return 1.0;
    }
    if statistic < MACKINNON_TAU_MIN {
        return 0.0;
    }
    let coefficients: &[f64] = if statistic <= MACKINNON_TAU_STAR {
        &MACKINNON_SMALL_P
    } else {
        &MACKINNON_LARGE_P
    };
    normal_cdf(polyval(coefficients, statistic))
}
