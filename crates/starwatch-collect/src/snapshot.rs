//! Account snapshots stored as JSON.
//!
//! Field names follow the GitHub REST payloads (`stargazers_count`,
//! `starred_at`, `commit.message`, ...) so raw API responses can be pasted
//! into a snapshot without reshaping.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use starwatch_core::{AccountStats, RepoStats, RepoSummary, StarEvent, StarwatchError};
use tracing::{debug, warn};

use crate::bots::BotMatcher;
use crate::{Collection, Collector};

/// A collected account snapshot.
///
/// # Examples
///
/// ```
/// use starwatch_collect::snapshot::Snapshot;
///
/// let json = r#"{
///   "account": "octocat",
///   "target": "hello",
///   "repositories": [
///     { "name": "hello", "stargazers_count": 3, "forks_count": 1,
///       "open_issues_count": 0, "created_at": "2024-11-13T08:00:00Z" }
///   ],
///   "stargazers": [
///     { "starred_at": "2024-11-13T09:00:00Z", "user": { "login": "a" } },
///     { "starred_at": "2024-11-13T09:04:00Z", "user": { "login": "b" } }
///   ]
/// }"#;
/// let snapshot = Snapshot::from_json(json).unwrap();
/// assert_eq!(snapshot.stargazers.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Account login.
    pub account: String,
    /// Name of the repository under investigation.
    pub target: String,
    /// Every repository owned by the account.
    pub repositories: Vec<RepoRecord>,
    /// Commits on the target, newest first.
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    /// Stargazers on the target with their star times.
    #[serde(default)]
    pub stargazers: Vec<StargazerRecord>,
}

/// A repository entry as returned by the repository listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub created_at: DateTime<Utc>,
}

/// A commit entry as returned by the commit listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub sha: String,
    pub commit: CommitBody,
    /// Linked account of the author; `null` for unlinked emails.
    #[serde(default)]
    pub author: Option<UserRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitBody {
    pub message: String,
    #[serde(default)]
    pub author: Option<GitSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// A stargazer entry from the `star+json` media type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StargazerRecord {
    pub starred_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
}

impl CommitRecord {
    /// Best available author identity: linked login, else the git author name.
    pub fn author_name(&self) -> &str {
        if let Some(user) = &self.author {
            return &user.login;
        }
        self.commit
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("")
    }
}

impl Snapshot {
    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StarwatchError::FileNotFound`] if `path` does not exist,
    /// [`StarwatchError::Serialization`] for malformed JSON, or
    /// [`StarwatchError::Snapshot`] if the target is not among the repositories.
    pub fn from_file(path: &Path) -> Result<Self, StarwatchError> {
        if !path.exists() {
            return Err(StarwatchError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::from_file`].
    pub fn from_json(content: &str) -> Result<Self, StarwatchError> {
        let snapshot: Self = serde_json::from_str(content)?;
        if !snapshot.repositories.iter().any(|r| r.name == snapshot.target) {
            return Err(StarwatchError::Snapshot(format!(
                "target repository '{}' is not listed under repositories",
                snapshot.target
            )));
        }
        Ok(snapshot)
    }

    fn target_record(&self) -> Result<&RepoRecord, StarwatchError> {
        self.repositories
            .iter()
            .find(|r| r.name == self.target)
            .ok_or_else(|| {
                StarwatchError::Snapshot(format!("target repository '{}' missing", self.target))
            })
    }
}

impl Collector for Snapshot {
    fn collect(
        &self,
        bots: &BotMatcher,
        sample_size: usize,
    ) -> Result<Collection, StarwatchError> {
        let target = self.target_record()?;

        let sampled = self.commits.iter().take(sample_size);
        let commit_stats = bots.count(sampled.map(|c| (c.commit.message.as_str(), c.author_name())));
        debug!(
            total = commit_stats.total,
            bot = commit_stats.bot,
            "classified target commits"
        );

        let account = AccountStats {
            login: self.account.clone(),
            repos: self
                .repositories
                .iter()
                .map(|r| RepoSummary {
                    name: r.name.clone(),
                    stars: r.stargazers_count,
                    forks: r.forks_count,
                    issues: r.open_issues_count,
                    created_at: r.created_at,
                })
                .collect(),
        };

        let target_stats = RepoStats {
            name: target.name.clone(),
            stars: target.stargazers_count,
            forks: target.forks_count,
            issues: target.open_issues_count,
            commit_count: commit_stats.total,
            bot_commit_count: commit_stats.bot,
            creation_date: target.created_at.date_naive(),
        };

        let events = self
            .stargazers
            .iter()
            .map(|s| StarEvent {
                timestamp: s.starred_at,
                user: s.user.as_ref().map(|u| u.login.clone()),
            })
            .collect();

        Ok(Collection {
            account,
            target: target_stats,
            stars: normalize_events(events),
        })
    }
}

/// Sort star events chronologically and drop duplicates.
///
/// An event is a duplicate when its stargazer has already starred (a user
/// can only star once; the earliest star is kept). Anonymous events (deleted
/// accounts) cannot be told apart, so they are all kept, including several
/// in the same second.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use starwatch_collect::snapshot::normalize_events;
/// use starwatch_core::StarEvent;
///
/// let t = |m| Utc.with_ymd_and_hms(2024, 1, 1, 0, m, 0).unwrap();
/// let star = |m, user: &str| StarEvent { timestamp: t(m), user: Some(user.into()) };
/// let events = vec![star(8, "a"), star(4, "b"), star(4, "b")];
/// let normalized = normalize_events(events);
/// assert_eq!(normalized.len(), 2);
/// assert_eq!(normalized[0].timestamp, t(4));
/// ```
pub fn normalize_events(mut events: Vec<StarEvent>) -> Vec<StarEvent> {
    let was_sorted = events.windows(2).all(|w| w[0] <= w[1]);
    if !was_sorted {
        warn!("star events were not in chronological order; sorting");
        events.sort();
    }

    let before = events.len();
    let mut seen_users: HashSet<String> = HashSet::new();
    let mut normalized: Vec<StarEvent> = Vec::with_capacity(events.len());
    for event in events {
        if let Some(user) = &event.user {
            if !seen_users.insert(user.clone()) {
                continue;
            }
        }
        normalized.push(event);
    }

    let dropped = before - normalized.len();
    if dropped > 0 {
        warn!(dropped, "dropped duplicate star events");
    }
    normalized
}
