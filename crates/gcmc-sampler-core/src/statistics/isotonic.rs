//! Isotonic (monotone non-decreasing) regression by pool-adjacent-violators.

/// Least-squares non-decreasing fit to `values` with unit weights.
pub fn isotonic_increasing(values: &[f64]) -> Vec<f64> {
    // Each block is (sum, count); adjacent blocks are merged while their means decrease.
    let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(values.len());
    for &v in values {
        blocks.push((v, 1));
        while blocks.len() >= 2 {
            let (s2, c2) = blocks[blocks.len() - 1];
            let (s1, c1) = blocks[blocks.len() - 2];
            if s1 / c1 as f64 <= s2 / c2 as f64 {
                break;
            }
            blocks.pop();
            let last = blocks.len() - 1;
            blocks[last] = (s1 + s2, c1 + c2);
        }
    }

    let mut fitted = Vec::with_capacity(values.len());
    for (sum, count) in blocks {
        let mean = sum / count as f64;
        fitted.extend(core::iter::repeat(mean).take(count));
    }
    fitted
}
