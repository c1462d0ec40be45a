use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StarwatchError;

/// Top-level configuration loaded from `.starwatch.toml`.
///
/// Resolution order: `--config` path > `./.starwatch.toml` > defaults.
/// Every section and key is optional.
///
/// # Examples
///
/// ```
/// use starwatch_core::StarwatchConfig;
///
/// let config = StarwatchConfig::default();
/// assert_eq!(config.intervals.max_clusters, 8);
/// assert_eq!(config.scoring.issue_rate_threshold, 0.01);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StarwatchConfig {
    /// Interval clustering settings.
    #[serde(default)]
    pub intervals: IntervalConfig,
    /// Clock-position concentration settings.
    #[serde(default)]
    pub temporal: TemporalConfig,
    /// Signal thresholds and point weights.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Bot commit classification.
    #[serde(default)]
    pub bots: BotConfig,
    /// Commit sampling.
    #[serde(default)]
    pub commits: CommitConfig,
}

impl StarwatchConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StarwatchError::Io`] if the file cannot be read,
    /// [`StarwatchError::Toml`] if the content is not valid TOML, or
    /// [`StarwatchError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use starwatch_core::StarwatchConfig;
    /// use std::path::Path;
    ///
    /// let config = StarwatchConfig::from_file(Path::new(".starwatch.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, StarwatchError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`StarwatchError::Toml`] if parsing fails, or
    /// [`StarwatchError::Config`] if validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_core::StarwatchConfig;
    ///
    /// let toml = r#"
    /// [scoring]
    /// issue_rate_threshold = 0.03
    /// "#;
    /// let config = StarwatchConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.scoring.issue_rate_threshold, 0.03);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, StarwatchError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), StarwatchError> {
        if self.intervals.max_clusters == 0 {
            return Err(StarwatchError::Config(
                "intervals.max_clusters must be at least 1".into(),
            ));
        }
        if self.intervals.distance_threshold.is_nan() || self.intervals.distance_threshold < 0.0 {
            return Err(StarwatchError::Config(
                "intervals.distance_threshold must be a non-negative number".into(),
            ));
        }
        for (name, value) in [
            ("scoring.issue_rate_threshold", self.scoring.issue_rate_threshold),
            ("scoring.fork_rate_threshold", self.scoring.fork_rate_threshold),
            ("scoring.bot_commit_threshold", self.scoring.bot_commit_threshold),
            ("temporal.concentration_threshold", self.temporal.concentration_threshold),
            (
                "temporal.hour_concentration_threshold",
                self.temporal.hour_concentration_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StarwatchError::Config(format!(
                    "{name} is a ratio and must be within 0.0..=1.0 (got {value})"
                )));
            }
        }
        if self.scoring.points_total().is_none() {
            return Err(StarwatchError::Config(format!(
                "scoring points must add up to at most {}",
                u32::MAX
            )));
        }
        if self.scoring.medium_level > self.scoring.high_level {
            return Err(StarwatchError::Config(format!(
                "scoring.medium_level ({}) must not exceed scoring.high_level ({})",
                self.scoring.medium_level, self.scoring.high_level
            )));
        }
        if self.temporal.automation_points_total().is_none() {
            return Err(StarwatchError::Config(format!(
                "temporal automation points must add up to at most {}",
                u32::MAX
            )));
        }
        if self.temporal.automation_evident_level > self.temporal.automation_high_level {
            return Err(StarwatchError::Config(format!(
                "temporal.automation_evident_level ({}) must not exceed temporal.automation_high_level ({})",
                self.temporal.automation_evident_level, self.temporal.automation_high_level
            )));
        }
        Ok(())
    }
}

/// How the distance between two groups of gaps is measured.
///
/// # Examples
///
/// ```
/// use starwatch_core::Linkage;
///
/// let linkage: Linkage = "ward".parse().unwrap();
/// assert_eq!(linkage, Linkage::Ward);
/// assert_eq!(Linkage::default(), Linkage::Centroid);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Absolute difference of the group means, in minutes.
    #[default]
    Centroid,
    /// Ward merge cost: `sqrt(2·na·nb / (na + nb)) · |mean_a − mean_b|`.
    Ward,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Centroid => write!(f, "centroid"),
            Linkage::Ward => write!(f, "ward"),
        }
    }
}

impl FromStr for Linkage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "centroid" => Ok(Linkage::Centroid),
            "ward" => Ok(Linkage::Ward),
            other => Err(format!("unknown linkage: {other}")),
        }
    }
}

/// Interval clustering configuration.
///
/// # Examples
///
/// ```
/// use starwatch_core::IntervalConfig;
///
/// let config = IntervalConfig::default();
/// assert_eq!(config.distance_threshold, 10.0);
/// assert_eq!(config.min_cluster_size, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Groups closer than this (minutes, under the chosen linkage) are merged (default: 10.0).
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    /// Upper bound on the number of groups; extra groups are merged (default: 8).
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,
    /// Groups smaller than this are reported as outliers (default: 3).
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// Distance measure between groups (default: centroid).
    #[serde(default)]
    pub linkage: Linkage,
    /// |z| above which a gap counts as a z-score outlier (default: 2.0).
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,
}

fn default_distance_threshold() -> f64 {
    10.0
}

fn default_max_clusters() -> usize {
    8
}

fn default_min_cluster_size() -> usize {
    3
}

fn default_zscore_threshold() -> f64 {
    2.0
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            max_clusters: default_max_clusters(),
            min_cluster_size: default_min_cluster_size(),
            linkage: Linkage::default(),
            zscore_threshold: default_zscore_threshold(),
        }
    }
}

/// Clock-position concentration and automation assessment configuration.
///
/// # Examples
///
/// ```
/// use starwatch_core::TemporalConfig;
///
/// let config = TemporalConfig::default();
/// assert_eq!(config.automation_max_score(), 100);
/// assert_eq!(config.automation_high_level, 70);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Fraction of stars near the top of the hour or the half hour that is suspicious (default: 0.20).
    #[serde(default = "default_concentration_threshold")]
    pub concentration_threshold: f64,
    /// Fraction of stars within a single hour of day that is suspicious (default: 0.15).
    #[serde(default = "default_hour_concentration_threshold")]
    pub hour_concentration_threshold: f64,
    /// Automation points when the main gap cluster has std below 5 minutes and at least 5 members (default: 40).
    #[serde(default = "default_regular_cluster_points")]
    pub regular_cluster_points: u32,
    /// Automation points when the main gap cluster has std below 10 minutes otherwise (default: 20).
    #[serde(default = "default_loose_cluster_points")]
    pub loose_cluster_points: u32,
    /// Automation points for a top-of-hour share above `concentration_threshold` (default: 30).
    #[serde(default = "default_top_of_hour_points")]
    pub top_of_hour_points: u32,
    /// Automation points for a busiest-hour share above `hour_concentration_threshold` (default: 20).
    #[serde(default = "default_busy_hour_points")]
    pub busy_hour_points: u32,
    /// Automation points when the gaps form only a few clusters (default: 10).
    #[serde(default = "default_few_patterns_points")]
    pub few_patterns_points: u32,
    /// Cluster count at or below which the gaps count as "a few patterns" (default: 3).
    #[serde(default = "default_few_patterns_max_clusters")]
    pub few_patterns_max_clusters: usize,
    /// Automation scores at or above this are rated high (default: 70).
    #[serde(default = "default_automation_high_level")]
    pub automation_high_level: u32,
    /// Automation scores at or above this are an evident pattern (default: 50).
    #[serde(default = "default_automation_evident_level")]
    pub automation_evident_level: u32,
}

impl TemporalConfig {
    /// Highest automation score reachable; only one cluster-regularity weight applies.
    pub fn automation_max_score(&self) -> u32 {
        self.regular_cluster_points
            .max(self.loose_cluster_points)
            .saturating_add(self.top_of_hour_points)
            .saturating_add(self.busy_hour_points)
            .saturating_add(self.few_patterns_points)
    }

    fn automation_points_total(&self) -> Option<u32> {
        self.regular_cluster_points
            .max(self.loose_cluster_points)
            .checked_add(self.top_of_hour_points)?
            .checked_add(self.busy_hour_points)?
            .checked_add(self.few_patterns_points)
    }
}

fn default_concentration_threshold() -> f64 {
    0.20
}

fn default_hour_concentration_threshold() -> f64 {
    0.15
}

fn default_regular_cluster_points() -> u32 {
    40
}

fn default_loose_cluster_points() -> u32 {
    20
}

fn default_top_of_hour_points() -> u32 {
    30
}

fn default_busy_hour_points() -> u32 {
    20
}

fn default_few_patterns_points() -> u32 {
    10
}

fn default_few_patterns_max_clusters() -> usize {
    3
}

fn default_automation_high_level() -> u32 {
    70
}

fn default_automation_evident_level() -> u32 {
    50
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            concentration_threshold: default_concentration_threshold(),
            hour_concentration_threshold: default_hour_concentration_threshold(),
            regular_cluster_points: default_regular_cluster_points(),
            loose_cluster_points: default_loose_cluster_points(),
            top_of_hour_points: default_top_of_hour_points(),
            busy_hour_points: default_busy_hour_points(),
            few_patterns_points: default_few_patterns_points(),
            few_patterns_max_clusters: default_few_patterns_max_clusters(),
            automation_high_level: default_automation_high_level(),
            automation_evident_level: default_automation_evident_level(),
        }
    }
}

/// Signal thresholds and point weights.
///
/// Ratios are fractions (`0.01` is 1 %). A signal contributes its points
/// only when it is critical.
///
/// # Examples
///
/// ```
/// use starwatch_core::ScoringConfig;
///
/// let config = ScoringConfig::default();
/// assert_eq!(config.max_score(), 150);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Account-wide issues/stars below this is critical (default: 0.01).
    #[serde(default = "default_issue_rate_threshold")]
    pub issue_rate_threshold: f64,
    /// Points for a critical issue rate (default: 30).
    #[serde(default = "default_issue_rate_points")]
    pub issue_rate_points: u32,
    /// Target forks/stars below this is critical (default: 0.10).
    #[serde(default = "default_fork_rate_threshold")]
    pub fork_rate_threshold: f64,
    /// The fork signal only fires above this many stars (default: 100).
    #[serde(default = "default_fork_min_stars")]
    pub fork_min_stars: u64,
    /// Points for a critical fork rate (default: 25).
    #[serde(default = "default_fork_rate_points")]
    pub fork_rate_points: u32,
    /// Bot commits/commits above this is critical (default: 0.85).
    #[serde(default = "default_bot_commit_threshold")]
    pub bot_commit_threshold: f64,
    /// Points for a critical bot-commit ratio (default: 25).
    #[serde(default = "default_bot_commit_points")]
    pub bot_commit_points: u32,
    /// Repositories needed on one creation date (default: 3).
    #[serde(default = "default_bulk_min_repos")]
    pub bulk_min_repos: usize,
    /// Repositories at or below this star count are ignored for bulk creation (default: 50).
    #[serde(default = "default_bulk_min_repo_stars")]
    pub bulk_min_repo_stars: u64,
    /// Combined stars on one date must exceed this (default: 1000).
    #[serde(default = "default_bulk_min_combined_stars")]
    pub bulk_min_combined_stars: u64,
    /// Points for bulk creation (default: 20).
    #[serde(default = "default_bulk_creation_points")]
    pub bulk_creation_points: u32,
    /// Points when the dominant interval cluster is highly regular (default: 40).
    #[serde(default = "default_clustering_points")]
    pub clustering_points: u32,
    /// Points for a half-hour concentration above the temporal threshold (default: 10).
    #[serde(default = "default_half_hour_points")]
    pub half_hour_points: u32,
    /// Scores above this are rated high (default: 80).
    #[serde(default = "default_high_level")]
    pub high_level: u32,
    /// Scores above this are rated medium (default: 50).
    #[serde(default = "default_medium_level")]
    pub medium_level: u32,
}

impl ScoringConfig {
    /// Sum of every signal's points, saturating at `u32::MAX`.
    pub fn max_score(&self) -> u32 {
        self.points().fold(0, u32::saturating_add)
    }

    /// Sum of every signal's points, or `None` if it does not fit in a `u32`.
    pub fn points_total(&self) -> Option<u32> {
        self.points().try_fold(0u32, u32::checked_add)
    }

    fn points(&self) -> impl Iterator<Item = u32> {
        [
            self.issue_rate_points,
            self.fork_rate_points,
            self.bot_commit_points,
            self.bulk_creation_points,
            self.clustering_points,
            self.half_hour_points,
        ]
        .into_iter()
    }
}

fn default_issue_rate_threshold() -> f64 {
    0.01
}

fn default_issue_rate_points() -> u32 {
    30
}

fn default_fork_rate_threshold() -> f64 {
    0.10
}

fn default_fork_min_stars() -> u64 {
    100
}

fn default_fork_rate_points() -> u32 {
    25
}

fn default_bot_commit_threshold() -> f64 {
    0.85
}

fn default_bot_commit_points() -> u32 {
    25
}

fn default_bulk_min_repos() -> usize {
    3
}

fn default_bulk_min_repo_stars() -> u64 {
    50
}

fn default_bulk_min_combined_stars() -> u64 {
    1000
}

fn default_bulk_creation_points() -> u32 {
    20
}

fn default_clustering_points() -> u32 {
    40
}

fn default_half_hour_points() -> u32 {
    10
}

fn default_high_level() -> u32 {
    80
}

fn default_medium_level() -> u32 {
    50
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            issue_rate_threshold: default_issue_rate_threshold(),
            issue_rate_points: default_issue_rate_points(),
            fork_rate_threshold: default_fork_rate_threshold(),
            fork_min_stars: default_fork_min_stars(),
            fork_rate_points: default_fork_rate_points(),
            bot_commit_threshold: default_bot_commit_threshold(),
            bot_commit_points: default_bot_commit_points(),
            bulk_min_repos: default_bulk_min_repos(),
            bulk_min_repo_stars: default_bulk_min_repo_stars(),
            bulk_min_combined_stars: default_bulk_min_combined_stars(),
            bulk_creation_points: default_bulk_creation_points(),
            clustering_points: default_clustering_points(),
            half_hour_points: default_half_hour_points(),
            high_level: default_high_level(),
            medium_level: default_medium_level(),
        }
    }
}

/// Bot commit classification.
///
/// # Examples
///
/// ```
/// use starwatch_core::BotConfig;
///
/// let config = BotConfig::default();
/// assert_eq!(config.message_patterns, vec!["Update TIME.md*"]);
/// assert_eq!(config.author_suffixes, vec!["[bot]"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Glob patterns matched against the first line of a commit message.
    #[serde(default = "default_message_patterns")]
    pub message_patterns: Vec<String>,
    /// Author names ending with any of these are bots.
    #[serde(default = "default_author_suffixes")]
    pub author_suffixes: Vec<String>,
}

fn default_message_patterns() -> Vec<String> {
    vec!["Update TIME.md*".into()]
}

fn default_author_suffixes() -> Vec<String> {
    vec!["[bot]".into()]
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            message_patterns: default_message_patterns(),
            author_suffixes: default_author_suffixes(),
        }
    }
}

/// Commit sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Number of most recent commits considered for the bot ratio (default: 100).
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Count merge commits when walking a local clone (default: true).
    #[serde(default = "default_include_merges")]
    pub include_merges: bool,
}

fn default_sample_size() -> usize {
    100
}

fn default_include_merges() -> bool {
    true
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            include_merges: default_include_merges(),
        }
    }
}
