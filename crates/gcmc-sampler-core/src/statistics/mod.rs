//! Statistical building blocks: running moments, autocorrelation, isotonic
//! regression, the augmented Dickey-Fuller test and exponential curve fitting.

mod adf;
mod autocorrelation;
mod curve_fit;
mod fft;
mod isotonic;
mod online_stats;

pub use adf::{adfuller, mackinnon_p_value, AdfResult};
pub use autocorrelation::acf_fft;
pub use curve_fit::{fit_exponential_decay, ExponentialFit};
pub use isotonic::isotonic_increasing;
pub use online_stats::{RunningStats, StatsSnapshot};
