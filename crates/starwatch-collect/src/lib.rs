//! Input side of the analysis: snapshots, bot classification, and git mining.
//!
//! Star histories are collected elsewhere (for example by dumping the REST
//! API responses); this crate loads such a snapshot, normalizes the star
//! events, classifies bot commits, and can recount commit statistics from a
//! local clone using git2.

pub mod bots;
pub mod mining;
pub mod snapshot;

use starwatch_core::{AccountStats, RepoStats, StarEvent, StarwatchError};

use crate::bots::BotMatcher;

/// Everything the analyzers need for one run.
#[derive(Debug, Clone)]
pub struct Collection {
    /// The account and all of its repositories.
    pub account: AccountStats,
    /// The repository under investigation.
    pub target: RepoStats,
    /// Chronological, deduplicated stars on the target.
    pub stars: Vec<StarEvent>,
}

impl Collection {
    /// Replace the commit counts on the target, e.g. with numbers mined from a clone.
    pub fn with_commit_stats(mut self, stats: bots::CommitStats) -> Self {
        self.target.commit_count = stats.total;
        self.target.bot_commit_count = stats.bot;
        self
    }
}

/// A source of collected account data.
pub trait Collector {
    /// Assemble the account listing, target statistics, and star history.
    ///
    /// # Errors
    ///
    /// Returns [`StarwatchError::Snapshot`] when the source is internally
    /// inconsistent (for example, the target repository is missing).
    fn collect(&self, bots: &BotMatcher, sample_size: usize)
        -> Result<Collection, StarwatchError>;
}
