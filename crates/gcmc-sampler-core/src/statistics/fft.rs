//! In-place radix-2 FFT over `nalgebra::Complex<f64>`.

use core::f64::consts::PI;

use nalgebra::Complex;

/// Direction of the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    /// Unnormalized inverse; callers divide by the length.
    Inverse,
}

/// Iterative Cooley-Tukey transform. `buf.len()` must be a power of two.
pub(crate) fn fft_in_place(buf: &mut [Complex<f64>], direction: Direction) {
    let n = buf.len();
    debug_assert!(n.is_power_of_two() || n == 0);
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            buf.swap(i, j);
        }
    }

    let sign = match direction {
        Direction::Forward => -1.0,
        Direction::Inverse => 1.0,
    };

    let mut len = 2;
    while len <= n {
        let angle = sign * 2.0 * PI / len as f64;
        let w_len = Complex::from_polar(1.0, angle);
        for chunk in buf.chunks_exact_mut(len) {
            let (lo, hi) = chunk.split_at_mut(len / 2);
            let mut w = Complex::new(1.0, 0.0);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = *b * w;
                *b = *a - t;
                *a += t;
                w *= w_len;
            }
        }
        len <<= 1;
    }
}
