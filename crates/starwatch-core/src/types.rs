use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single star on the target repository.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use starwatch_core::StarEvent;
///
/// let event = StarEvent::new(Utc.with_ymd_and_hms(2024, 11, 13, 8, 30, 0).unwrap());
/// assert!(event.user.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarEvent {
    /// When the star was given.
    pub timestamp: DateTime<Utc>,
    /// Login of the stargazer, when known.
    pub user: Option<String>,
}

impl StarEvent {
    /// Create an anonymous star event.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            user: None,
        }
    }
}

/// Engagement and commit statistics for the analyzed repository.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use starwatch_core::RepoStats;
///
/// let stats = RepoStats {
///     name: "indie-tools".into(),
///     stars: 785,
///     forks: 60,
///     issues: 2,
///     commit_count: 100,
///     bot_commit_count: 89,
///     creation_date: NaiveDate::from_ymd_opt(2024, 11, 13).unwrap(),
/// };
/// assert_eq!(stats.stars, 785);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    /// Repository name (without owner).
    pub name: String,
    /// Stargazer count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Open issue count.
    pub issues: u64,
    /// Commits considered for the bot ratio.
    pub commit_count: u64,
    /// Commits among those classified as bot-authored.
    pub bot_commit_count: u64,
    /// Date the repository was created (UTC).
    pub creation_date: NaiveDate,
}

/// One repository in the account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    /// Repository name (without owner).
    pub name: String,
    /// Stargazer count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Open issue count.
    pub issues: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Every repository owned by the analyzed account.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use starwatch_core::{AccountStats, RepoSummary};
///
/// let account = AccountStats {
///     login: "octocat".into(),
///     repos: vec![
///         RepoSummary { name: "a".into(), stars: 10, forks: 1, issues: 2, created_at: Utc::now() },
///         RepoSummary { name: "b".into(), stars: 5, forks: 0, issues: 0, created_at: Utc::now() },
///     ],
/// };
/// assert_eq!(account.total_stars(), 15);
/// assert_eq!(account.total_issues(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    /// Account login.
    pub login: String,
    /// All repositories in the listing.
    pub repos: Vec<RepoSummary>,
}

impl AccountStats {
    /// Stars summed over every repository.
    pub fn total_stars(&self) -> u64 {
        self.repos.iter().map(|r| r.stars).sum()
    }

    /// Forks summed over every repository.
    pub fn total_forks(&self) -> u64 {
        self.repos.iter().map(|r| r.forks).sum()
    }

    /// Open issues summed over every repository.
    pub fn total_issues(&self) -> u64 {
        self.repos.iter().map(|r| r.issues).sum()
    }
}

/// How tightly a cluster of gaps is packed.
///
/// # Examples
///
/// ```
/// use starwatch_core::Regularity;
///
/// assert_eq!(Regularity::classify(3.5, 44), Regularity::HighlyRegular);
/// assert_eq!(Regularity::classify(7.0, 4), Regularity::Regular);
/// assert_eq!(Regularity::classify(3.5, 2), Regularity::Irregular);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regularity {
    /// Standard deviation under 5 minutes with at least 5 members.
    HighlyRegular,
    /// Standard deviation under 10 minutes with at least 3 members.
    Regular,
    /// Anything looser.
    Irregular,
}

impl Regularity {
    /// Classify a cluster from its standard deviation (minutes) and size.
    pub fn classify(std_dev: f64, member_count: usize) -> Self {
        if std_dev < 5.0 && member_count >= 5 {
            Regularity::HighlyRegular
        } else if std_dev < 10.0 && member_count >= 3 {
            Regularity::Regular
        } else {
            Regularity::Irregular
        }
    }
}

impl fmt::Display for Regularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regularity::HighlyRegular => write!(f, "highly regular"),
            Regularity::Regular => write!(f, "regular"),
            Regularity::Irregular => write!(f, "irregular"),
        }
    }
}

/// A group of similar inter-star gaps.
///
/// All interval values are in minutes. `fraction_of_total` is relative to
/// every gap in the history, outliers included.
///
/// # Examples
///
/// ```
/// use starwatch_core::{IntervalCluster, Regularity};
///
/// let cluster = IntervalCluster {
///     mean_interval: 4.3,
///     std_dev: 3.5,
///     member_count: 44,
///     fraction_of_total: 44.0 / 99.0,
///     min_interval: 0.5,
///     max_interval: 11.0,
///     regularity: Regularity::HighlyRegular,
/// };
/// assert!(cluster.fraction_of_total < 0.45);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalCluster {
    /// Mean gap.
    pub mean_interval: f64,
    /// Population standard deviation of the gaps.
    pub std_dev: f64,
    /// Number of gaps in the cluster.
    pub member_count: usize,
    /// `member_count / total gaps`.
    pub fraction_of_total: f64,
    /// Smallest gap.
    pub min_interval: f64,
    /// Largest gap.
    pub max_interval: f64,
    /// Tightness label.
    pub regularity: Regularity,
}

/// Outcome of evaluating one heuristic signal.
///
/// # Examples
///
/// ```
/// use starwatch_core::SignalStatus;
///
/// assert_eq!(SignalStatus::Critical.to_string(), "CRITICAL");
/// assert!(SignalStatus::Critical.is_flagged());
/// assert!(!SignalStatus::InsufficientData.is_flagged());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalStatus {
    /// Within normal range.
    Ok,
    /// Past its threshold; contributes points.
    Critical,
    /// Past its threshold for a supporting (lower-confidence) indicator.
    Suspicious,
    /// Not enough input to evaluate.
    InsufficientData,
}

impl SignalStatus {
    /// Whether the signal fired.
    pub fn is_flagged(self) -> bool {
        matches!(self, SignalStatus::Critical | SignalStatus::Suspicious)
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStatus::Ok => write!(f, "OK"),
            SignalStatus::Critical => write!(f, "CRITICAL"),
            SignalStatus::Suspicious => write!(f, "SUSPICIOUS"),
            SignalStatus::InsufficientData => write!(f, "INSUFFICIENT DATA"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use starwatch_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown report.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
