//! Bot commit classification.

use glob::Pattern;
use serde::Serialize;
use starwatch_core::{BotConfig, StarwatchError};

/// Commit totals for the bot-ratio signal.
///
/// # Examples
///
/// ```
/// use starwatch_collect::bots::CommitStats;
///
/// let stats = CommitStats { total: 100, bot: 89 };
/// assert_eq!(stats.total - stats.bot, 11);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    /// Commits examined.
    pub total: u64,
    /// Commits classified as bot-authored.
    pub bot: u64,
}

/// Decides whether a commit was made by an automated process.
///
/// A commit is a bot commit when the first line of its message matches any
/// configured glob, or its author name ends with a configured suffix.
///
/// # Examples
///
/// ```
/// use starwatch_collect::bots::BotMatcher;
/// use starwatch_core::BotConfig;
///
/// let matcher = BotMatcher::new(&BotConfig::default()).unwrap();
/// assert!(matcher.is_bot("Update TIME.md with current time", "alice"));
/// assert!(matcher.is_bot("chore: bump deps", "dependabot[bot]"));
/// assert!(!matcher.is_bot("fix: handle empty input", "alice"));
/// ```
#[derive(Debug, Clone)]
pub struct BotMatcher {
    message_patterns: Vec<Pattern>,
    author_suffixes: Vec<String>,
}

impl BotMatcher {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`StarwatchError::Config`] if a message pattern is not a valid glob.
    pub fn new(config: &BotConfig) -> Result<Self, StarwatchError> {
        let message_patterns = config
            .message_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    StarwatchError::Config(format!("invalid bot message pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            message_patterns,
            author_suffixes: config.author_suffixes.clone(),
        })
    }

    /// Classify one commit.
    pub fn is_bot(&self, message: &str, author: &str) -> bool {
        let summary = message.lines().next().unwrap_or("").trim();
        if self.message_patterns.iter().any(|p| p.matches(summary)) {
            return true;
        }
        let author = author.trim();
        !author.is_empty()
            && self
                .author_suffixes
                .iter()
                .any(|suffix| !suffix.is_empty() && author.ends_with(suffix.as_str()))
    }

    /// Count bot commits over `(message, author)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use starwatch_collect::bots::BotMatcher;
    /// use starwatch_core::BotConfig;
    ///
    /// let matcher = BotMatcher::new(&BotConfig::default()).unwrap();
    /// let stats = matcher.count([
    ///     ("Update TIME.md with current time", "xm"),
    ///     ("Update TIME.md with current time", "xm"),
    ///     ("Add README", "xm"),
    /// ]);
    /// assert_eq!(stats.total, 3);
    /// assert_eq!(stats.bot, 2);
    /// ```
    pub fn count<'a, I>(&self, commits: I) -> CommitStats
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut stats = CommitStats::default();
        for (message, author) in commits {
            stats.total += 1;
            if self.is_bot(message, author) {
                stats.bot += 1;
            }
        }
        stats
    }
}
