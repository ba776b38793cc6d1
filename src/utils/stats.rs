//! Statistical utility functions.

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Score at the given percentile using linear interpolation between order statistics.
///
/// The rank of percentile `p` is `p / 100 * (n - 1)`; the result interpolates
/// between the two sorted values surrounding that rank. This matches the
/// classic `scoreatpercentile` definition.
///
/// # Arguments
/// * `values` - Input values (need not be sorted)
/// * `p` - Percentile in `[0, 100]`, clamped otherwise
///
/// # Returns
/// The interpolated score, or NaN for empty input.
///
/// # Example
/// ```
/// use greenwave::utils::percentile;
///
/// let q1 = percentile(&[4.0, 1.0, 3.0, 2.0], 25.0);
/// assert!((q1 - 1.75).abs() < 1e-12);
/// ```
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    percentile_sorted(&sorted, p)
}

/// Same as [`percentile`] for input that is already sorted ascending.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// First and third quartiles, computed from a single sort.
pub fn quartiles(values: &[f64]) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    (percentile_sorted(&sorted, 25.0), percentile_sorted(&sorted, 75.0))
}
