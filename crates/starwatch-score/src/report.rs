use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use starwatch_core::{
    AccountStats, IntervalCluster, RepoStats, ScoringConfig, SignalStatus, StarwatchConfig,
};
use starwatch_intervals::{AutomationAssessment, IntervalAnalysis, TemporalProfile};
use tracing::debug;

use crate::bulk::{creation_days, CreationDay};
use crate::signals::{self, Signal};

/// Complete suspicion analysis for one repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspicionReport {
    /// Account login.
    pub account: String,
    /// Analyzed repository name.
    pub target: String,
    /// Account-wide issues per star.
    pub issue_rate: Option<f64>,
    /// Target forks per star.
    pub fork_rate: Option<f64>,
    /// Target bot commits per commit.
    pub bot_commit_ratio: Option<f64>,
    /// Shared creation dates, oldest first.
    pub bulk_creation_flags: Vec<CreationDay>,
    /// Interval clusters, largest first.
    pub clusters: Vec<IntervalCluster>,
    /// Full interval analysis.
    pub intervals: IntervalAnalysis,
    /// Clock-position profile, when there were stars.
    pub temporal: Option<TemporalProfile>,
    /// Timing-only automation assessment.
    pub automation: AutomationAssessment,
    /// Every evaluated signal.
    pub signals: Vec<Signal>,
    /// Sum of the points of critical signals.
    pub score: u32,
    /// Highest attainable score.
    pub max_score: u32,
    /// Categorical rating of `score`.
    pub level: SuspicionLevel,
}

/// Categorical suspicion rating.
///
/// Ordered from least to most suspicious so `--fail-on` can compare levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuspicionLevel {
    /// Score at or below the medium cut-off.
    Low,
    /// Score above the medium cut-off.
    Medium,
    /// Score above the high cut-off.
    High,
}

impl SuspicionLevel {
    /// Map a score to a level using the configured cut-offs.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_core::ScoringConfig;
    /// use starwatch_score::SuspicionLevel;
    ///
    /// let config = ScoringConfig::default();
    /// assert_eq!(SuspicionLevel::from_score(50, &config), SuspicionLevel::Low);
    /// assert_eq!(SuspicionLevel::from_score(55, &config), SuspicionLevel::Medium);
    /// assert_eq!(SuspicionLevel::from_score(120, &config), SuspicionLevel::High);
    /// ```
    pub fn from_score(score: u32, config: &ScoringConfig) -> Self {
        if score > config.high_level {
            SuspicionLevel::High
        } else if score > config.medium_level {
            SuspicionLevel::Medium
        } else {
            SuspicionLevel::Low
        }
    }

    /// Returns `true` if `self` is at least as suspicious as `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_score::SuspicionLevel;
    ///
    /// assert!(SuspicionLevel::High.meets_threshold(SuspicionLevel::Medium));
    /// assert!(SuspicionLevel::Medium.meets_threshold(SuspicionLevel::Medium));
    /// assert!(!SuspicionLevel::Low.meets_threshold(SuspicionLevel::Medium));
    /// ```
    pub fn meets_threshold(self, threshold: SuspicionLevel) -> bool {
        self >= threshold
    }
}

impl fmt::Display for SuspicionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspicionLevel::Low => write!(f, "Low"),
            SuspicionLevel::Medium => write!(f, "Medium"),
            SuspicionLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for SuspicionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(SuspicionLevel::Low),
            "medium" => Ok(SuspicionLevel::Medium),
            "high" => Ok(SuspicionLevel::High),
            other => Err(format!("unknown suspicion level: {other}")),
        }
    }
}

/// Evaluate every signal and aggregate them into a report.
///
/// Signals that lack input are reported as insufficient data and contribute
/// nothing; the rest of the report is still produced.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use starwatch_core::{AccountStats, RepoStats, StarwatchConfig};
/// use starwatch_intervals::analyze_intervals;
/// use starwatch_score::{score, SuspicionLevel};
///
/// let config = StarwatchConfig::default();
/// let account = AccountStats { login: "octocat".into(), repos: vec![] };
/// let target = RepoStats {
///     name: "hello".into(),
///     stars: 0,
///     forks: 0,
///     issues: 0,
///     commit_count: 0,
///     bot_commit_count: 0,
///     creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// };
/// let intervals = analyze_intervals(&[], &config.intervals);
///
/// let report = score(&account, &target, intervals, None, &config);
/// assert_eq!(report.score, 0);
/// assert_eq!(report.level, SuspicionLevel::Low);
/// assert_eq!(report.max_score, 150);
/// ```
pub fn score(
    account: &AccountStats,
    target: &RepoStats,
    intervals: IntervalAnalysis,
    temporal: Option<TemporalProfile>,
    config: &StarwatchConfig,
) -> SuspicionReport {
    let scoring = &config.scoring;
    let bulk = creation_days(&account.repos, scoring);

    let evaluated = vec![
        signals::evaluate_issue_rate(account, scoring),
        signals::evaluate_fork_rate(target, scoring),
        signals::evaluate_bot_commits(target, scoring),
        signals::evaluate_bulk_creation(&bulk, scoring),
        signals::evaluate_time_clustering(&intervals, scoring),
        signals::evaluate_half_hour(temporal.as_ref(), &config.temporal, scoring),
    ];

    let total = evaluated
        .iter()
        .filter(|s| s.status == SignalStatus::Critical)
        .map(|s| s.points)
        .fold(0, u32::saturating_add);
    let level = SuspicionLevel::from_score(total, scoring);
    debug!(score = total, max = scoring.max_score(), %level, "suspicion scored");

    let automation =
        AutomationAssessment::assess(intervals.summary(), temporal.as_ref(), &config.temporal);
    debug!(score = automation.score, verdict = %automation.verdict, "automation assessed");

    SuspicionReport {
        account: account.login.clone(),
        target: target.name.clone(),
        issue_rate: signals::issue_rate(account.total_issues(), account.total_stars()),
        fork_rate: signals::fork_rate(target.forks, target.stars),
        bot_commit_ratio: signals::bot_commit_ratio(target.bot_commit_count, target.commit_count),
        bulk_creation_flags: bulk,
        clusters: intervals
            .summary()
            .map(|s| s.clusters.clone())
            .unwrap_or_default(),
        intervals,
        temporal,
        automation,
        signals: evaluated,
        score: total,
        max_score: scoring.max_score(),
        level,
    }
}

impl SuspicionReport {
    /// Signals that contributed points.
    pub fn critical_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .filter(|s| s.status == SignalStatus::Critical)
    }

    /// Render the report as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use starwatch_core::{AccountStats, RepoStats, StarwatchConfig};
    /// use starwatch_intervals::analyze_intervals;
    /// use starwatch_score::score;
    ///
    /// let config = StarwatchConfig::default();
    /// let account = AccountStats { login: "octocat".into(), repos: vec![] };
    /// let target = RepoStats {
    ///     name: "hello".into(),
    ///     stars: 0,
    ///     forks: 0,
    ///     issues: 0,
    ///     commit_count: 0,
    ///     bot_commit_count: 0,
    ///     creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    /// };
    /// let report = score(&account, &target, analyze_intervals(&[], &config.intervals), None, &config);
    /// let md = report.to_markdown();
    /// assert!(md.contains("# Suspicion Report: octocat/hello"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Suspicion Report: {}/{}\n\n",
            self.account, self.target
        ));
        out.push_str(&format!(
            "**Score:** {}/{} ({})\n\n",
            self.score, self.max_score, self.level
        ));

        out.push_str("| Signal | Value | Threshold | Status | Points |\n");
        out.push_str("|--------|-------|-----------|--------|--------|\n");
        for s in &self.signals {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                s.kind,
                s.display_value(),
                s.display_threshold(),
                s.status,
                s.points,
            ));
        }
        out.push('\n');

        if !self.bulk_creation_flags.is_empty() {
            out.push_str("## Shared creation dates\n\n");
            for day in &self.bulk_creation_flags {
                out.push_str(&format!(
                    "- {}: {} ({} stars){}\n",
                    day.date,
                    day.repos.join(", "),
                    day.combined_stars,
                    if day.flagged { " **flagged**" } else { "" },
                ));
            }
            out.push('\n');
        }

        out.push_str(
            &IntervalsView::new(&self.intervals, self.temporal.as_ref())
                .with_automation(&self.automation)
                .to_markdown(),
        );
        out
    }
}

impl fmt::Display for SuspicionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Suspicion Report: {}/{}", self.account, self.target)?;
        writeln!(f, "==================")?;
        writeln!(
            f,
            "Score: {}/{} ({})\n",
            self.score, self.max_score, self.level
        )?;

        writeln!(
            f,
            "{:<26} {:>10} {:>12} {:>18} {:>6}",
            "Signal", "Value", "Threshold", "Status", "Points"
        )?;
        writeln!(f, "{}", "-".repeat(76))?;
        for s in &self.signals {
            writeln!(
                f,
                "{:<26} {:>10} {:>12} {:>18} {:>6}",
                s.kind.to_string(),
                s.display_value(),
                s.display_threshold(),
                s.status.to_string(),
                s.points,
            )?;
            if !s.detail.is_empty() {
                writeln!(f, "  {}", s.detail)?;
            }
        }

        for day in self.bulk_creation_flags.iter().filter(|d| d.flagged) {
            writeln!(
                f,
                "\nBulk creation on {}: {} ({} stars)",
                day.date,
                day.repos.join(", "),
                day.combined_stars
            )?;
        }

        writeln!(f)?;
        write!(
            f,
            "{}",
            IntervalsView::new(&self.intervals, self.temporal.as_ref())
                .with_automation(&self.automation)
        )
    }
}

/// Text and markdown rendering of an interval analysis and clock profile.
///
/// Shared by the full report and the `intervals` command.
pub struct IntervalsView<'a> {
    intervals: &'a IntervalAnalysis,
    temporal: Option<&'a TemporalProfile>,
    automation: Option<&'a AutomationAssessment>,
}

impl<'a> IntervalsView<'a> {
    pub fn new(intervals: &'a IntervalAnalysis, temporal: Option<&'a TemporalProfile>) -> Self {
        Self {
            intervals,
            temporal,
            automation: None,
        }
    }

    /// Also render an automation assessment after the clock profile.
    pub fn with_automation(mut self, automation: &'a AutomationAssessment) -> Self {
        self.automation = Some(automation);
        self
    }

    /// Render as markdown sections.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("## Star intervals\n\n");
        match self.intervals {
            IntervalAnalysis::InsufficientData { reason } => {
                out.push_str(&format!("_{reason}_\n"));
            }
            IntervalAnalysis::Clustered(summary) => {
                if !summary.clusters.is_empty() {
                    out.push_str("| Mean (min) | Std | Members | Share | Regularity |\n");
                    out.push_str("|------------|-----|---------|-------|------------|\n");
                    for c in &summary.clusters {
                        out.push_str(&format!(
                            "| {:.1} | {:.1} | {} | {:.1}% | {} |\n",
                            c.mean_interval,
                            c.std_dev,
                            c.member_count,
                            c.fraction_of_total * 100.0,
                            c.regularity,
                        ));
                    }
                    out.push('\n');
                }
                out.push_str(&format!(
                    "**Gaps:** {}, {} outlier(s), {} z-score outlier(s)\n",
                    summary.total_gaps,
                    summary.outliers.len(),
                    summary.zscore_outliers
                ));
            }
        }

        if let Some(t) = self.temporal {
            out.push_str("\n## Clock position\n\n");
            out.push_str(&format!(
                "- Busiest hour: {:02}:00 UTC, {:.1}% ({})\n",
                t.busiest_hour,
                t.busiest_hour_fraction * 100.0,
                t.busiest_hour_status
            ));
            out.push_str(&format!(
                "- Top of hour: {:.1}% ({})\n",
                t.top_of_hour_fraction * 100.0,
                t.top_of_hour_status
            ));
            out.push_str(&format!(
                "- Half hour: {:.1}% ({})\n",
                t.half_hour_fraction * 100.0,
                t.half_hour_status
            ));
        }

        if let Some(a) = self.automation {
            out.push_str("\n## Automation\n\n");
            out.push_str(&format!(
                "**Automation score:** {}/{} ({})\n",
                a.score, a.max_score, a.verdict
            ));
            if !a.evidence.is_empty() {
                out.push('\n');
                for line in &a.evidence {
                    out.push_str(&format!("- {line}\n"));
                }
            }
        }
        out
    }
}

impl fmt::Display for IntervalsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Star intervals")?;
        writeln!(f, "--------------")?;
        match self.intervals {
            IntervalAnalysis::InsufficientData { reason } => writeln!(f, "{reason}")?,
            IntervalAnalysis::Clustered(summary) => {
                writeln!(
                    f,
                    "{} gaps, {} cluster(s), {} outlier(s), {} z-score outlier(s) [{} linkage]",
                    summary.total_gaps,
                    summary.clusters.len(),
                    summary.outliers.len(),
                    summary.zscore_outliers,
                    summary.linkage
                )?;
                for (i, c) in summary.clusters.iter().enumerate() {
                    writeln!(
                        f,
                        "  #{:<2} {:>8.1} min ±{:<6.1} {:>4} gaps {:>6.1}%  [{:.1}..{:.1}]  {}",
                        i + 1,
                        c.mean_interval,
                        c.std_dev,
                        c.member_count,
                        c.fraction_of_total * 100.0,
                        c.min_interval,
                        c.max_interval,
                        c.regularity
                    )?;
                }
            }
        }

        if let Some(t) = self.temporal {
            writeln!(f, "\nClock position (UTC, {} stars)", t.total_events)?;
            writeln!(
                f,
                "  busiest hour {:02}:00  {:>5.1}%  {}",
                t.busiest_hour,
                t.busiest_hour_fraction * 100.0,
                t.busiest_hour_status
            )?;
            writeln!(
                f,
                "  minutes 0-5    {:>5.1}%  {}",
                t.top_of_hour_fraction * 100.0,
                t.top_of_hour_status
            )?;
            writeln!(
                f,
                "  minutes 25-35  {:>5.1}%  {}",
                t.half_hour_fraction * 100.0,
                t.half_hour_status
            )?;
        }

        if let Some(a) = self.automation {
            writeln!(
                f,
                "\nAutomation score: {}/{} ({})",
                a.score, a.max_score, a.verdict
            )?;
            for line in &a.evidence {
                writeln!(f, "  - {line}")?;
            }
        }
        Ok(())
    }
}
