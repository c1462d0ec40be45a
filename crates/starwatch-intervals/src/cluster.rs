//! One-dimensional agglomerative clustering of gaps.
//!
//! Gaps are sorted and every group is a contiguous run of the sorted values,
//! so only neighbouring groups are ever merge candidates. Merging stops once
//! the closest neighbours are farther apart than the distance threshold and
//! no more than `max_clusters` groups remain. Groups smaller than
//! `min_cluster_size` become outliers.

use serde::Serialize;
use starwatch_core::{IntervalCluster, IntervalConfig, Linkage, Regularity};
use tracing::debug;

use crate::outliers::zscore_outliers;
use crate::stats::mean_std;

/// Clusters and outliers for one star history.
///
/// # Examples
///
/// ```
/// use starwatch_core::IntervalConfig;
/// use starwatch_intervals::cluster_gaps;
///
/// let summary = cluster_gaps(&[4.0, 4.0, 4.0, 25.0, 25.0, 25.0, 900.0], &IntervalConfig::default());
/// assert_eq!(summary.clusters.len(), 2);
/// assert_eq!(summary.outliers, vec![900.0]);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    /// Number of gaps analyzed.
    pub total_gaps: usize,
    /// Clusters by member count, largest first.
    pub clusters: Vec<IntervalCluster>,
    /// Gaps that did not land in any cluster, ascending.
    pub outliers: Vec<f64>,
    /// `outliers.len() / total_gaps`.
    pub outlier_fraction: f64,
    /// Gaps whose |z| exceeds the configured z-score threshold.
    pub zscore_outliers: usize,
    /// Distance measure used.
    pub linkage: Linkage,
}

impl ClusterSummary {
    /// The largest cluster, if any.
    pub fn main_cluster(&self) -> Option<&IntervalCluster> {
        self.clusters.first()
    }

    /// Sum of every cluster's `fraction_of_total`.
    pub fn clustered_fraction(&self) -> f64 {
        self.clusters.iter().map(|c| c.fraction_of_total).sum()
    }
}

/// A contiguous run `start..end` of the sorted gaps.
#[derive(Debug, Clone, Copy)]
struct Group {
    start: usize,
    end: usize,
    sum: f64,
}

impl Group {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn mean(&self) -> f64 {
        self.sum / self.len() as f64
    }
}

fn distance(a: &Group, b: &Group, linkage: Linkage) -> f64 {
    let delta = (a.mean() - b.mean()).abs();
    match linkage {
        Linkage::Centroid => delta,
        Linkage::Ward => {
            let (na, nb) = (a.len() as f64, b.len() as f64);
            (2.0 * na * nb / (na + nb)).sqrt() * delta
        }
    }
}

/// Cluster gap values (minutes).
///
/// An empty input produces an empty summary. Every gap ends up either in
/// exactly one cluster or in `outliers`, so the cluster fractions plus the
/// outlier fraction add up to one.
pub fn cluster_gaps(gaps: &[f64], config: &IntervalConfig) -> ClusterSummary {
    let mut sorted: Vec<f64> = gaps.iter().copied().filter(|g| g.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let total = sorted.len();

    let mut groups = initial_groups(&sorted);
    let mut merges = 0usize;
    while groups.len() > 1 {
        let (idx, dist) = closest_neighbours(&groups, config.linkage);
        if dist > config.distance_threshold && groups.len() <= config.max_clusters {
            break;
        }
        let right = groups.remove(idx + 1);
        let left = &mut groups[idx];
        left.end = right.end;
        left.sum += right.sum;
        merges += 1;
    }
    debug!(
        gaps = total,
        groups = groups.len(),
        merges,
        linkage = %config.linkage,
        "gap clustering finished"
    );

    let mut clusters = Vec::new();
    let mut outliers = Vec::new();
    for group in &groups {
        let members = &sorted[group.start..group.end];
        if members.len() < config.min_cluster_size {
            outliers.extend_from_slice(members);
            continue;
        }
        let (mean, std_dev) = mean_std(members);
        clusters.push(IntervalCluster {
            mean_interval: mean,
            std_dev,
            member_count: members.len(),
            fraction_of_total: members.len() as f64 / total as f64,
            min_interval: members[0],
            max_interval: members[members.len() - 1],
            regularity: Regularity::classify(std_dev, members.len()),
        });
    }

    clusters.sort_by(|a, b| {
        b.member_count
            .cmp(&a.member_count)
            .then(a.mean_interval.total_cmp(&b.mean_interval))
    });

    let outlier_fraction = if total > 0 {
        outliers.len() as f64 / total as f64
    } else {
        0.0
    };

    ClusterSummary {
        total_gaps: total,
        clusters,
        outliers,
        outlier_fraction,
        zscore_outliers: zscore_outliers(&sorted, config.zscore_threshold).len(),
        linkage: config.linkage,
    }
}

// Runs of identical values start out as one group; they are at distance 0
// and would be merged first under either linkage anyway.
fn initial_groups(sorted: &[f64]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for (i, &value) in sorted.iter().enumerate() {
        match groups.last_mut() {
            Some(last) if sorted[last.end - 1] == value => {
                last.end = i + 1;
                last.sum += value;
            }
            _ => groups.push(Group {
                start: i,
                end: i + 1,
                sum: value,
            }),
        }
    }
    groups
}

/// Index of the left group of the closest neighbouring pair, and its distance.
fn closest_neighbours(groups: &[Group], linkage: Linkage) -> (usize, f64) {
    groups
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i, distance(&pair[0], &pair[1], linkage)))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IntervalConfig {
        IntervalConfig::default()
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        let summary = cluster_gaps(&[], &config());
        assert_eq!(summary.total_gaps, 0);
        assert!(summary.clusters.is_empty());
        assert!(summary.outliers.is_empty());
        assert_eq!(summary.outlier_fraction, 0.0);
    }

    #[test]
    fn single_gap_is_an_outlier() {
        let summary = cluster_gaps(&[12.0], &config());
        assert!(summary.clusters.is_empty());
        assert_eq!(summary.outliers, vec![12.0]);
        assert_eq!(summary.outlier_fraction, 1.0);
    }

    #[test]
    fn identical_gaps_form_one_tight_cluster() {
        let summary = cluster_gaps(&[4.0; 10], &config());
        assert_eq!(summary.clusters.len(), 1);
        let c = &summary.clusters[0];
        assert_eq!(c.member_count, 10);
        assert_eq!(c.std_dev, 0.0);
        assert_eq!(c.fraction_of_total, 1.0);
        assert_eq!(c.regularity, Regularity::HighlyRegular);
    }

    #[test]
    fn nearby_gaps_chain_together() {
        let gaps = [1.0, 3.0, 5.0, 7.0, 9.0, 60.0, 62.0, 64.0];
        let summary = cluster_gaps(&gaps, &config());
        assert_eq!(summary.clusters.len(), 2);
        assert_eq!(summary.clusters[0].member_count, 5);
        assert_eq!(summary.clusters[0].mean_interval, 5.0);
        assert_eq!(summary.clusters[0].min_interval, 1.0);
        assert_eq!(summary.clusters[0].max_interval, 9.0);
        assert_eq!(summary.clusters[1].mean_interval, 62.0);
    }

    #[test]
    fn max_clusters_forces_merges() {
        let gaps = [0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 200.0, 200.0, 200.0];
        let capped = IntervalConfig {
            max_clusters: 2,
            ..config()
        };
        let summary = cluster_gaps(&gaps, &capped);
        assert_eq!(summary.clusters.len(), 2);
        assert_eq!(summary.clusters[0].member_count, 6);
    }

    #[test]
    fn zero_threshold_only_merges_identical_values() {
        let zero = IntervalConfig {
            distance_threshold: 0.0,
            ..config()
        };
        let summary = cluster_gaps(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0], &zero);
        assert_eq!(summary.clusters.len(), 2);
    }

    #[test]
    fn ward_penalizes_large_groups() {
        // Centroid distance 8 merges; Ward height sqrt(2*20*20/40)*8 ≈ 35.8 does not.
        let mut gaps = vec![10.0; 20];
        gaps.extend(vec![18.0; 20]);

        let centroid = cluster_gaps(&gaps, &config());
        assert_eq!(centroid.clusters.len(), 1);

        let ward = IntervalConfig {
            linkage: Linkage::Ward,
            ..config()
        };
        let summary = cluster_gaps(&gaps, &ward);
        assert_eq!(summary.clusters.len(), 2);
        assert_eq!(summary.linkage, Linkage::Ward);
    }

    #[test]
    fn non_finite_gaps_are_ignored() {
        let summary = cluster_gaps(&[4.0, 4.0, 4.0, f64::NAN, f64::INFINITY], &config());
        assert_eq!(summary.total_gaps, 3);
        assert_eq!(summary.clusters.len(), 1);
    }

    #[test]
    fn ties_are_ordered_by_mean() {
        let summary = cluster_gaps(&[30.0, 30.0, 30.0, 4.0, 4.0, 4.0], &config());
        assert_eq!(summary.clusters[0].mean_interval, 4.0);
        assert_eq!(summary.clusters[1].mean_interval, 30.0);
    }

    #[test]
    fn fractions_and_outliers_cover_every_gap() {
        let gaps = [
            0.5, 1.0, 2.0, 4.0, 4.0, 6.0, 8.0, 25.0, 26.0, 24.0, 90.0, 300.0, 301.0, 302.0,
            1440.0,
        ];
        let summary = cluster_gaps(&gaps, &config());
        let covered = summary.clustered_fraction() + summary.outlier_fraction;
        assert!((covered - 1.0).abs() < 1e-9, "covered {covered}");
        assert!(summary.clustered_fraction() <= 1.0 + 1e-12);
    }
}
