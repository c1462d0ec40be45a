//! Core types, configuration, and error handling for starwatch.
//!
//! This crate provides the shared foundation used by all other starwatch crates:
//! - [`StarwatchError`] — unified error type using `thiserror`
//! - [`StarwatchConfig`] — configuration loaded from `.starwatch.toml`
//! - Shared types: [`StarEvent`], [`RepoStats`], [`AccountStats`],
//!   [`IntervalCluster`], [`SignalStatus`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    BotConfig, CommitConfig, IntervalConfig, Linkage, ScoringConfig, StarwatchConfig,
    TemporalConfig,
};
pub use error::StarwatchError;
pub use types::{
    AccountStats, IntervalCluster, OutputFormat, Regularity, RepoStats, RepoSummary,
    SignalStatus, StarEvent,
};

/// A convenience `Result` type for starwatch operations.
pub type Result<T> = std::result::Result<T, StarwatchError>;
