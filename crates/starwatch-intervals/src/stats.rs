//! Small descriptive statistics helpers.

/// Mean and population standard deviation of `values`.
///
/// Returns `(0.0, 0.0)` for an empty slice.
///
/// # Examples
///
/// ```
/// use starwatch_intervals::stats::mean_std;
///
/// let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
/// assert_eq!(mean, 5.0);
/// assert_eq!(std, 2.0);
/// ```
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_is_zero() {
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn constant_values_have_no_spread() {
        let (mean, std) = mean_std(&[4.0; 44]);
        assert_eq!(mean, 4.0);
        assert_eq!(std, 0.0);
    }
}
