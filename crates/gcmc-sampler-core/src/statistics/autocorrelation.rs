//! Sample autocorrelation via zero-padded FFT.

use nalgebra::Complex;

use super::fft::{fft_in_place, Direction};

/// Autocorrelation function of `values` for lags `0..=nlags`.
///
/// The series is demeaned and zero-padded to a power of two of at least
/// twice its length, so the circular correlation equals the linear one.
/// Autocovariances are normalized by `n` (the biased estimator) and then by
/// the lag-0 autocovariance. `nlags` is capped at `n - 1`.
///
/// A constant series has no fluctuation to correlate; its ACF is reported
/// as 1 at lag 0 and 0 elsewhere.
pub fn acf_fft(values: &[f64], nlags: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let nlags = nlags.min(n - 1);

    let mean = values.iter().sum::<f64>() / n as f64;
    let size = (2 * n).next_power_of_two();
    let mut buf: Vec<Complex<f64>> = values
        .iter()
        .map(|&v| Complex::new(v - mean, 0.0))
        .chain(core::iter::repeat(Complex::new(0.0, 0.0)))
        .take(size)
        .collect();

    fft_in_place(&mut buf, Direction::Forward);
    for z in buf.iter_mut() {
        *z = Complex::new(z.norm_sqr(), 0.0);
    }
    fft_in_place(&mut buf, Direction::Inverse);

    let scale = size as f64 * n as f64;
    let acov0 = buf[0].re / scale;
    if acov0 <= 0.0 || !acov0.is_finite() {
        let mut acf = vec![0.0; nlags + 1];
        acf[0] = 1.0;
        return acf;
    }

    buf[..=nlags]
        .iter()
        .map(|z| (z.re / scale) / acov0)
        .collect()
}
