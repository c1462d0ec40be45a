//! Z-score outlier detection over raw gaps.

use crate::stats::mean_std;

/// Indices of gaps whose absolute z-score exceeds `threshold`.
///
/// Uses the population standard deviation. A set with no spread has no
/// outliers.
///
/// # Examples
///
/// ```
/// use starwatch_intervals::outliers::zscore_outliers;
///
/// let mut gaps = vec![4.0; 20];
/// gaps.push(600.0);
/// assert_eq!(zscore_outliers(&gaps, 2.0), vec![20]);
/// ```
pub fn zscore_outliers(gaps: &[f64], threshold: f64) -> Vec<usize> {
    let (mean, std) = mean_std(gaps);
    if std == 0.0 {
        return Vec::new();
    }
    gaps.iter()
        .enumerate()
        .filter(|(_, g)| ((*g - mean) / std).abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}
