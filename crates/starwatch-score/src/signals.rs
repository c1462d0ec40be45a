//! Individual heuristic signals.
//!
//! Each signal compares one engagement ratio or timing statistic against a
//! configured threshold. Missing denominators degrade to
//! [`SignalStatus::InsufficientData`] instead of failing.

use std::fmt;

use serde::Serialize;
use starwatch_core::{
    AccountStats, Regularity, RepoStats, ScoringConfig, SignalStatus, TemporalConfig,
};
use starwatch_intervals::{IntervalAnalysis, TemporalProfile};
use tracing::debug;

use crate::bulk::CreationDay;

/// Which heuristic a [`Signal`] reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Account-wide open issues per star.
    IssueRate,
    /// Target forks per star.
    ForkRate,
    /// Share of bot-authored commits on the target.
    BotCommits,
    /// Several high-star repositories created on one date.
    BulkCreation,
    /// Dominant inter-star gap cluster is highly regular.
    TimeClustering,
    /// Stars concentrated around the half hour.
    HalfHourConcentration,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::IssueRate => write!(f, "Low issue rate"),
            SignalKind::ForkRate => write!(f, "Low fork rate"),
            SignalKind::BotCommits => write!(f, "Bot commits"),
            SignalKind::BulkCreation => write!(f, "Bulk creation"),
            SignalKind::TimeClustering => write!(f, "Time clustering"),
            SignalKind::HalfHourConcentration => write!(f, "Half-hour concentration"),
        }
    }
}

/// How a signal's value and threshold should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalUnit {
    /// A fraction rendered as a percentage.
    Ratio,
    /// Minutes.
    Minutes,
    /// A plain count.
    Count,
}

impl SignalUnit {
    /// Format a raw value in this unit.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_score::signals::SignalUnit;
    ///
    /// assert_eq!(SignalUnit::Ratio.format(0.0091), "0.91%");
    /// assert_eq!(SignalUnit::Minutes.format(3.46), "3.5 min");
    /// assert_eq!(SignalUnit::Count.format(2.0), "2");
    /// ```
    pub fn format(self, value: f64) -> String {
        match self {
            SignalUnit::Ratio => format!("{:.2}%", value * 100.0),
            SignalUnit::Minutes => format!("{value:.1} min"),
            SignalUnit::Count => format!("{value:.0}"),
        }
    }
}

/// Which side of the threshold is anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Values strictly below the threshold fire.
    Below,
    /// Values strictly above the threshold fire.
    Above,
}

impl Comparison {
    /// Classify `value` against `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_core::SignalStatus;
    /// use starwatch_score::signals::Comparison;
    ///
    /// assert_eq!(Comparison::Below.classify(0.0091, 0.03), SignalStatus::Critical);
    /// assert_eq!(Comparison::Above.classify(0.89, 0.85), SignalStatus::Critical);
    /// assert_eq!(Comparison::Above.classify(0.85, 0.85), SignalStatus::Ok);
    /// ```
    pub fn classify(self, value: f64, threshold: f64) -> SignalStatus {
        let fired = match self {
            Comparison::Below => value < threshold,
            Comparison::Above => value > threshold,
        };
        if fired {
            SignalStatus::Critical
        } else {
            SignalStatus::Ok
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Below => "<",
            Comparison::Above => ">",
        }
    }
}

/// Outcome of one heuristic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Which heuristic this is.
    pub kind: SignalKind,
    /// Measured value; `None` when it could not be computed.
    pub value: Option<f64>,
    /// Threshold the value was compared against.
    pub threshold: f64,
    /// Direction of the comparison.
    pub comparison: Comparison,
    /// Rendering unit for `value` and `threshold`.
    pub unit: SignalUnit,
    /// Points contributed to the score (zero unless critical).
    pub points: u32,
    /// Evaluation outcome.
    pub status: SignalStatus,
    /// One-line explanation.
    pub detail: String,
}

impl Signal {
    fn new(
        kind: SignalKind,
        value: Option<f64>,
        threshold: f64,
        comparison: Comparison,
        unit: SignalUnit,
    ) -> Self {
        Self {
            kind,
            value,
            threshold,
            comparison,
            unit,
            points: 0,
            status: SignalStatus::InsufficientData,
            detail: String::new(),
        }
    }

    fn resolve(mut self, status: SignalStatus, weight: u32, detail: impl Into<String>) -> Self {
        self.status = status;
        self.points = if status == SignalStatus::Critical { weight } else { 0 };
        self.detail = detail.into();
        debug!(kind = ?self.kind, value = ?self.value, status = %self.status, points = self.points, "signal evaluated");
        self
    }

    /// Value rendered in its unit, or `n/a`.
    pub fn display_value(&self) -> String {
        self.value
            .map(|v| self.unit.format(v))
            .unwrap_or_else(|| "n/a".into())
    }

    /// Threshold rendered with its comparison, e.g. `< 1.00%`.
    pub fn display_threshold(&self) -> String {
        format!("{} {}", self.comparison.symbol(), self.unit.format(self.threshold))
    }
}

/// `numerator / denominator`, or `None` for an empty denominator.
///
/// # Examples
///
/// ```
/// use starwatch_score::signals::ratio;
///
/// assert_eq!(ratio(89, 100), Some(0.89));
/// assert_eq!(ratio(3, 0), None);
/// ```
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Open issues per star across the whole account.
pub fn issue_rate(issues: u64, total_stars: u64) -> Option<f64> {
    ratio(issues, total_stars)
}

/// Forks per star on one repository.
pub fn fork_rate(forks: u64, stars: u64) -> Option<f64> {
    ratio(forks, stars)
}

/// Bot-authored commits per commit.
pub fn bot_commit_ratio(bot_commits: u64, commits: u64) -> Option<f64> {
    ratio(bot_commits, commits)
}

/// Starred projects that nobody files issues against are rarely used.
pub fn evaluate_issue_rate(account: &AccountStats, config: &ScoringConfig) -> Signal {
    let value = issue_rate(account.total_issues(), account.total_stars());
    let signal = Signal::new(
        SignalKind::IssueRate,
        value,
        config.issue_rate_threshold,
        Comparison::Below,
        SignalUnit::Ratio,
    );
    match value {
        None => signal.resolve(
            SignalStatus::InsufficientData,
            config.issue_rate_points,
            "account has no stars",
        ),
        Some(rate) => {
            let status = Comparison::Below.classify(rate, config.issue_rate_threshold);
            signal.resolve(
                status,
                config.issue_rate_points,
                format!(
                    "{} issues across {} stars",
                    account.total_issues(),
                    account.total_stars()
                ),
            )
        }
    }
}

/// Genuine interest in a project shows up as forks.
pub fn evaluate_fork_rate(target: &RepoStats, config: &ScoringConfig) -> Signal {
    let value = fork_rate(target.forks, target.stars);
    let signal = Signal::new(
        SignalKind::ForkRate,
        value,
        config.fork_rate_threshold,
        Comparison::Below,
        SignalUnit::Ratio,
    );
    match value {
        None => signal.resolve(
            SignalStatus::InsufficientData,
            config.fork_rate_points,
            "repository has no stars",
        ),
        Some(_) if target.stars <= config.fork_min_stars => signal.resolve(
            SignalStatus::Ok,
            config.fork_rate_points,
            format!(
                "{} stars is too few to judge (needs more than {})",
                target.stars, config.fork_min_stars
            ),
        ),
        Some(rate) => signal.resolve(
            Comparison::Below.classify(rate, config.fork_rate_threshold),
            config.fork_rate_points,
            format!("{} forks for {} stars", target.forks, target.stars),
        ),
    }
}

/// Scheduled bot commits keep a repository looking active.
pub fn evaluate_bot_commits(target: &RepoStats, config: &ScoringConfig) -> Signal {
    let value = bot_commit_ratio(target.bot_commit_count, target.commit_count);
    let signal = Signal::new(
        SignalKind::BotCommits,
        value,
        config.bot_commit_threshold,
        Comparison::Above,
        SignalUnit::Ratio,
    );
    match value {
        None => signal.resolve(
            SignalStatus::InsufficientData,
            config.bot_commit_points,
            "no commits collected",
        ),
        Some(r) => signal.resolve(
            Comparison::Above.classify(r, config.bot_commit_threshold),
            config.bot_commit_points,
            format!(
                "{} of {} commits are automated",
                target.bot_commit_count, target.commit_count
            ),
        ),
    }
}

/// Flags accounts that spin up several high-star repositories in one day.
pub fn evaluate_bulk_creation(days: &[CreationDay], config: &ScoringConfig) -> Signal {
    let flagged: Vec<&CreationDay> = days.iter().filter(|d| d.flagged).collect();
    let signal = Signal::new(
        SignalKind::BulkCreation,
        Some(flagged.len() as f64),
        0.0,
        Comparison::Above,
        SignalUnit::Count,
    );
    let status = if flagged.is_empty() {
        SignalStatus::Ok
    } else {
        SignalStatus::Critical
    };
    let detail = match flagged.iter().max_by_key(|d| d.combined_stars) {
        Some(day) => format!(
            "{}: {} repos created with {} combined stars",
            day.date,
            day.repos.len(),
            day.combined_stars
        ),
        None => format!("{} shared creation date(s), none above thresholds", days.len()),
    };
    signal.resolve(status, config.bulk_creation_points, detail)
}

/// Flags a dominant gap cluster tight enough to be a timer.
pub fn evaluate_time_clustering(intervals: &IntervalAnalysis, config: &ScoringConfig) -> Signal {
    let summary = match intervals {
        IntervalAnalysis::InsufficientData { reason } => {
            return Signal::new(
                SignalKind::TimeClustering,
                None,
                5.0,
                Comparison::Below,
                SignalUnit::Minutes,
            )
            .resolve(
                SignalStatus::InsufficientData,
                config.clustering_points,
                reason.to_string(),
            );
        }
        IntervalAnalysis::Clustered(summary) => summary,
    };

    let Some(main) = summary.main_cluster() else {
        return Signal::new(
            SignalKind::TimeClustering,
            None,
            5.0,
            Comparison::Below,
            SignalUnit::Minutes,
        )
        .resolve(
            SignalStatus::Ok,
            config.clustering_points,
            format!("no clusters among {} gaps", summary.total_gaps),
        );
    };

    let status = if main.regularity == Regularity::HighlyRegular {
        SignalStatus::Critical
    } else {
        SignalStatus::Ok
    };
    Signal::new(
        SignalKind::TimeClustering,
        Some(main.std_dev),
        5.0,
        Comparison::Below,
        SignalUnit::Minutes,
    )
    .resolve(
        status,
        config.clustering_points,
        format!(
            "main cluster holds {:.1}% of gaps at {:.1}±{:.1} min ({})",
            main.fraction_of_total * 100.0,
            main.mean_interval,
            main.std_dev,
            main.regularity
        ),
    )
}

/// Flags stars piling up around the half hour.
pub fn evaluate_half_hour(
    temporal: Option<&TemporalProfile>,
    temporal_config: &TemporalConfig,
    config: &ScoringConfig,
) -> Signal {
    let signal = Signal::new(
        SignalKind::HalfHourConcentration,
        temporal.map(|t| t.half_hour_fraction),
        temporal_config.concentration_threshold,
        Comparison::Above,
        SignalUnit::Ratio,
    );
    match temporal {
        None => signal.resolve(
            SignalStatus::InsufficientData,
            config.half_hour_points,
            "no star events",
        ),
        Some(profile) => signal.resolve(
            if profile.half_hour_status.is_flagged() {
                SignalStatus::Critical
            } else {
                SignalStatus::Ok
            },
            config.half_hour_points,
            format!("of {} stars, at minutes 25-35", profile.total_events),
        ),
    }
}
