//! Automation assessment: timing evidence folded into one score and verdict.
//!
//! Independent of the suspicion score. It only looks at star timing, so it
//! also answers "do these stars look scheduled?" for the `intervals` command.

use std::fmt;

use serde::Serialize;
use starwatch_core::TemporalConfig;

use crate::cluster::ClusterSummary;
use crate::temporal::TemporalProfile;

const REGULAR_STD: f64 = 5.0;
const REGULAR_MIN_MEMBERS: usize = 5;
const LOOSE_STD: f64 = 10.0;

/// How strongly the timing points at a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationVerdict {
    /// Below the evident cut-off.
    Low,
    /// At or above the evident cut-off.
    Evident,
    /// At or above the high cut-off.
    High,
}

impl AutomationVerdict {
    /// Map a score onto a verdict using the configured cut-offs.
    pub fn from_score(score: u32, config: &TemporalConfig) -> Self {
        if score >= config.automation_high_level {
            AutomationVerdict::High
        } else if score >= config.automation_evident_level {
            AutomationVerdict::Evident
        } else {
            AutomationVerdict::Low
        }
    }
}

impl fmt::Display for AutomationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationVerdict::Low => write!(f, "low likelihood of automation"),
            AutomationVerdict::Evident => write!(f, "evident automation pattern"),
            AutomationVerdict::High => write!(f, "high likelihood of automation"),
        }
    }
}

/// Timing evidence for automated starring.
///
/// # Examples
///
/// ```
/// use starwatch_core::{IntervalConfig, TemporalConfig};
/// use starwatch_intervals::{cluster_gaps, AutomationAssessment, AutomationVerdict};
///
/// let summary = cluster_gaps(&[4.0; 12], &IntervalConfig::default());
/// let assessment = AutomationAssessment::assess(Some(&summary), None, &TemporalConfig::default());
/// // Tight single cluster: regular pattern plus few patterns.
/// assert_eq!(assessment.score, 50);
/// assert_eq!(assessment.verdict, AutomationVerdict::Evident);
/// assert_eq!(assessment.evidence.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAssessment {
    /// Sum of the contributing weights.
    pub score: u32,
    /// Highest reachable score under the current weights.
    pub max_score: u32,
    /// One line per contribution, in scoring order.
    pub evidence: Vec<String>,
    /// Categorical rating of `score`.
    pub verdict: AutomationVerdict,
}

impl AutomationAssessment {
    /// Score the interval clusters and clock profile.
    ///
    /// Missing inputs contribute nothing. Contributions:
    /// a main cluster with std below 5 minutes and at least 5 members
    /// (`regular_cluster_points`), otherwise std below 10 minutes
    /// (`loose_cluster_points`); a top-of-hour share above
    /// `concentration_threshold`; a busiest-hour share above
    /// `hour_concentration_threshold`; between one and
    /// `few_patterns_max_clusters` clusters.
    pub fn assess(
        summary: Option<&ClusterSummary>,
        temporal: Option<&TemporalProfile>,
        config: &TemporalConfig,
    ) -> Self {
        let mut score = 0u32;
        let mut evidence = Vec::new();
        let mut add = |points: u32, line: String| {
            score = score.saturating_add(points);
            evidence.push(line);
        };

        if let Some(main) = summary.and_then(ClusterSummary::main_cluster) {
            if main.std_dev < REGULAR_STD && main.member_count >= REGULAR_MIN_MEMBERS {
                add(
                    config.regular_cluster_points,
                    format!(
                        "regular interval pattern: {:.1} ± {:.1} min over {} gaps",
                        main.mean_interval, main.std_dev, main.member_count
                    ),
                );
            } else if main.std_dev < LOOSE_STD {
                add(
                    config.loose_cluster_points,
                    format!(
                        "moderately regular intervals: {:.1} ± {:.1} min",
                        main.mean_interval, main.std_dev
                    ),
                );
            }
        }

        if let Some(t) = temporal {
            if t.top_of_hour_fraction > config.concentration_threshold {
                add(
                    config.top_of_hour_points,
                    format!(
                        "{:.1}% of stars at minutes 0-5 of the hour",
                        t.top_of_hour_fraction * 100.0
                    ),
                );
            }
            if t.busiest_hour_fraction > config.hour_concentration_threshold {
                add(
                    config.busy_hour_points,
                    format!(
                        "{:.1}% of stars at {:02}:00 UTC",
                        t.busiest_hour_fraction * 100.0,
                        t.busiest_hour
                    ),
                );
            }
        }

        if let Some(s) = summary {
            let clusters = s.clusters.len();
            if (1..=config.few_patterns_max_clusters).contains(&clusters) {
                add(
                    config.few_patterns_points,
                    format!("only {clusters} distinct interval pattern(s)"),
                );
            }
        }

        Self {
            score,
            max_score: config.automation_max_score(),
            evidence,
            verdict: AutomationVerdict::from_score(score, config),
        }
    }
}
