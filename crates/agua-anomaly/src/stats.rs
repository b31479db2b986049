//! Window statistics
//!
//! Plain functions over slices. Callers guarantee non-empty input.

/// Arithmetic mean.
///
/// Stays finite for finite input even when the plain sum would overflow.
pub fn mean(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty());
    let n = values.len() as f64;
    let total = values.iter().sum::<f64>();
    if total.is_finite() {
        return total / n;
    }
    values.iter().map(|x| x / n).sum()
}

/// Population standard deviation (divides by n, not n - 1).
///
/// A window of identical values returns exactly `0.0`, so that rounding in
/// the mean never turns a flat signal into a tiny non-zero spread.
pub fn population_std(values: &[f64], mean: f64) -> f64 {
    debug_assert!(!values.is_empty());
    if is_constant(values) {
        return 0.0;
    }
    let n = values.len() as f64;
    let plain = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
    if plain.is_finite() {
        return plain;
    }

    // squared deviations overflowed: rescale into [-1, 1] and scale back
    let scale = values.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let scaled: Vec<f64> = values.iter().map(|x| x / scale).collect();
    scale * population_std(&scaled, self::mean(&scaled))
}

/// `(value - mean) / std`, halving the operands when the difference overflows.
///
/// `std` must be non-zero.
pub fn standardize(value: f64, mean: f64, std: f64) -> f64 {
    let z = (value - mean) / std;
    if z.is_finite() {
        return z;
    }
    (value / 2.0 - mean / 2.0) / (std / 2.0)
}

pub fn is_constant(values: &[f64]) -> bool {
    values.first().is_some_and(|first| values.iter().all(|v| v == first))
}

/// Quantile of already-sorted data, linear interpolation between the two
/// closest ranks (`h = (n - 1) * p`).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&p));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Sorted copy of a window
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}
