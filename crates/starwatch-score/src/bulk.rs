//! Bulk repository creation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use starwatch_core::{RepoSummary, ScoringConfig};
use tracing::debug;

/// Qualifying repositories that share a creation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationDay {
    /// Creation date (UTC).
    pub date: NaiveDate,
    /// Names of the qualifying repositories created that day.
    pub repos: Vec<String>,
    /// Stars summed over those repositories.
    pub combined_stars: u64,
    /// Whether the day meets every bulk-creation threshold.
    pub flagged: bool,
}

/// Group repositories with more than `bulk_min_repo_stars` stars by creation
/// date.
///
/// Every date with at least two qualifying repositories is returned, oldest
/// first. A date is flagged when it holds at least `bulk_min_repos`
/// repositories and their combined stars exceed `bulk_min_combined_stars`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use starwatch_core::{RepoSummary, ScoringConfig};
/// use starwatch_score::bulk::creation_days;
///
/// let day = Utc.with_ymd_and_hms(2024, 11, 13, 9, 0, 0).unwrap();
/// let repos: Vec<_> = [("a", 785), ("b", 912), ("c", 716)]
///     .into_iter()
///     .map(|(name, stars)| RepoSummary {
///         name: name.into(),
///         stars,
///         forks: 0,
///         issues: 0,
///         created_at: day,
///     })
///     .collect();
///
/// let days = creation_days(&repos, &ScoringConfig::default());
/// assert_eq!(days.len(), 1);
/// assert_eq!(days[0].combined_stars, 2413);
/// assert!(days[0].flagged);
/// ```
pub fn creation_days(repos: &[RepoSummary], config: &ScoringConfig) -> Vec<CreationDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&RepoSummary>> = BTreeMap::new();
    for repo in repos.iter().filter(|r| r.stars > config.bulk_min_repo_stars) {
        by_date
            .entry(repo.created_at.date_naive())
            .or_default()
            .push(repo);
    }

    by_date
        .into_iter()
        .filter(|(_, repos)| repos.len() >= 2)
        .map(|(date, repos)| {
            let combined_stars = repos.iter().map(|r| r.stars).sum();
            let flagged = repos.len() >= config.bulk_min_repos
                && combined_stars > config.bulk_min_combined_stars;
            debug!(%date, repos = repos.len(), combined_stars, flagged, "shared creation date");
            CreationDay {
                date,
                repos: repos.iter().map(|r| r.name.clone()).collect(),
                combined_stars,
                flagged,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn repo(name: &str, stars: u64, day: u32) -> RepoSummary {
        RepoSummary {
            name: name.into(),
            stars,
            forks: 0,
            issues: 0,
            created_at: Utc.with_ymd_and_hms(2024, 11, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_listing_has_no_days() {
        assert!(creation_days(&[], &ScoringConfig::default()).is_empty());
    }

    #[test]
    fn low_star_repos_do_not_qualify() {
        let repos = [repo("a", 50, 1), repo("b", 10, 1), repo("c", 2000, 1)];
        assert!(creation_days(&repos, &ScoringConfig::default()).is_empty());
    }

    #[test]
    fn pairs_are_reported_but_not_flagged() {
        let repos = [repo("a", 900, 3), repo("b", 900, 3)];
        let days = creation_days(&repos, &ScoringConfig::default());
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].repos, vec!["a", "b"]);
        assert!(!days[0].flagged);
    }

    #[test]
    fn combined_stars_must_exceed_threshold() {
        let repos = [repo("a", 300, 5), repo("b", 300, 5), repo("c", 400, 5)];
        let days = creation_days(&repos, &ScoringConfig::default());
        assert_eq!(days[0].combined_stars, 1000);
        assert!(!days[0].flagged);
    }

    #[test]
    fn days_are_ordered_and_time_of_day_is_ignored() {
        let mut late = repo("late", 800, 2);
        late.created_at = Utc.with_ymd_and_hms(2024, 11, 2, 23, 59, 0).unwrap();
        let repos = [
            repo("x", 800, 9),
            repo("y", 800, 9),
            repo("early", 800, 2),
            late,
            repo("z", 800, 9),
        ];
        let days = creation_days(&repos, &ScoringConfig::default());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
        assert!(!days[0].flagged);
        assert!(days[1].flagged);
        assert_eq!(days[1].combined_stars, 2400);
    }
}
