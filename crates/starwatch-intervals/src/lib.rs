//! Star timing analysis: inter-arrival gaps, gap clustering, and clock-position
//! concentration.
//!
//! Organic stars arrive irregularly. Scripted stars tend to arrive on a
//! schedule, which shows up as a dominant, tight cluster of identical gaps
//! and as stars piling up at particular minutes of the hour. Both kinds of
//! evidence are combined into an [`AutomationAssessment`].

pub mod automation;
pub mod cluster;
pub mod gaps;
pub mod outliers;
pub mod stats;
pub mod temporal;

use serde::Serialize;
use starwatch_core::{IntervalConfig, StarEvent};
use tracing::debug;

pub use automation::{AutomationAssessment, AutomationVerdict};
pub use cluster::{cluster_gaps, ClusterSummary};
pub use gaps::{gaps_in_minutes, InsufficientReason};
pub use temporal::TemporalProfile;

/// Result of running the interval analyzer over a star history.
///
/// # Examples
///
/// ```
/// use starwatch_core::IntervalConfig;
/// use starwatch_intervals::{analyze_intervals, IntervalAnalysis};
///
/// let analysis = analyze_intervals(&[], &IntervalConfig::default());
/// assert!(matches!(analysis, IntervalAnalysis::InsufficientData { .. }));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum IntervalAnalysis {
    /// The history could not be analyzed.
    InsufficientData {
        /// Why the history was rejected.
        reason: InsufficientReason,
    },
    /// Gaps were computed and clustered.
    Clustered(ClusterSummary),
}

impl IntervalAnalysis {
    /// The cluster summary, if the analysis ran.
    pub fn summary(&self) -> Option<&ClusterSummary> {
        match self {
            IntervalAnalysis::Clustered(summary) => Some(summary),
            IntervalAnalysis::InsufficientData { .. } => None,
        }
    }
}

/// Compute gaps between consecutive stars and cluster them.
///
/// Never fails: fewer than two events, or events out of chronological order,
/// yield [`IntervalAnalysis::InsufficientData`].
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use starwatch_core::{IntervalConfig, StarEvent};
/// use starwatch_intervals::analyze_intervals;
///
/// let start = Utc.with_ymd_and_hms(2024, 11, 13, 0, 0, 0).unwrap();
/// let events: Vec<_> = (0..11)
///     .map(|i| StarEvent::new(start + Duration::minutes(4 * i)))
///     .collect();
///
/// let analysis = analyze_intervals(&events, &IntervalConfig::default());
/// let summary = analysis.summary().unwrap();
/// assert_eq!(summary.total_gaps, 10);
/// assert_eq!(summary.clusters.len(), 1);
/// assert_eq!(summary.clusters[0].mean_interval, 4.0);
/// ```
pub fn analyze_intervals(events: &[StarEvent], config: &IntervalConfig) -> IntervalAnalysis {
    let gaps = match gaps_in_minutes(events) {
        Ok(gaps) => gaps,
        Err(reason) => {
            debug!(%reason, "interval analysis skipped");
            return IntervalAnalysis::InsufficientData { reason };
        }
    };
    IntervalAnalysis::Clustered(cluster_gaps(&gaps, config))
}
