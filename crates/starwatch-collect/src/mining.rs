//! Commit statistics from a local clone via git2.
//!
//! The snapshot only carries whatever commit page was captured; a clone of
//! the target gives the authoritative history for the bot-commit ratio.

use std::path::Path;

use git2::{Repository, Sort};
use starwatch_core::StarwatchError;
use tracing::debug;

use crate::bots::{BotMatcher, CommitStats};

/// Options for commit mining.
///
/// # Examples
///
/// ```
/// use starwatch_collect::mining::MiningOptions;
///
/// let opts = MiningOptions::default();
/// assert_eq!(opts.sample_size, 100);
/// assert!(opts.include_merges);
/// ```
pub struct MiningOptions {
    /// Number of most recent commits to examine (default: 100).
    pub sample_size: usize,
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Count merge commits (default: true). Skipped merges do not count
    /// towards `sample_size`.
    pub include_merges: bool,
}

impl Default for MiningOptions {
    fn default() -> Self {
        Self {
            sample_size: 100,
            branch: None,
            include_merges: true,
        }
    }
}

/// Count bot commits among the most recent commits of a local repository.
///
/// Commits are walked newest first. The summary line and the author name of
/// each commit go through `matcher`.
///
/// # Errors
///
/// Returns [`StarwatchError::Git`] if the repository cannot be opened or walked.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use starwatch_collect::bots::BotMatcher;
/// use starwatch_collect::mining::{mine_commit_stats, MiningOptions};
/// use starwatch_core::BotConfig;
///
/// let matcher = BotMatcher::new(&BotConfig::default()).unwrap();
/// let stats = mine_commit_stats(Path::new("."), &matcher, &MiningOptions::default()).unwrap();
/// println!("{} of {} commits look automated", stats.bot, stats.total);
/// ```
pub fn mine_commit_stats(
    repo_path: &Path,
    matcher: &BotMatcher,
    options: &MiningOptions,
) -> Result<CommitStats, StarwatchError> {
    let repo = Repository::open(repo_path)
        .map_err(|e| StarwatchError::Git(format!("failed to open repository: {e}")))?;

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| StarwatchError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk.set_sorting(Sort::TIME).ok();

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| {
                StarwatchError::Git(format!("failed to resolve branch '{branch}': {e}"))
            })?;
        let oid = reference
            .target()
            .ok_or_else(|| StarwatchError::Git("branch has no target".into()))?;
        revwalk
            .push(oid)
            .map_err(|e| StarwatchError::Git(format!("failed to push oid: {e}")))?;
    } else {
        revwalk
            .push_head()
            .map_err(|e| StarwatchError::Git(format!("failed to push HEAD: {e}")))?;
    }

    let mut stats = CommitStats::default();
    for oid_result in revwalk {
        if stats.total as usize >= options.sample_size {
            break;
        }
        let oid = oid_result.map_err(|e| StarwatchError::Git(format!("revwalk error: {e}")))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| StarwatchError::Git(format!("failed to find commit: {e}")))?;

        if !options.include_merges && commit.parent_count() > 1 {
            continue;
        }

        let message = commit.summary().unwrap_or("");
        let author = commit.author();
        let author_name = author.name().unwrap_or("");

        stats.total += 1;
        if matcher.is_bot(message, author_name) {
            stats.bot += 1;
        }
    }

    debug!(
        path = %repo_path.display(),
        total = stats.total,
        bot = stats.bot,
        "mined commit stats"
    );
    Ok(stats)
}
