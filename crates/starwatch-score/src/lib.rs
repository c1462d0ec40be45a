//! Suspicion scoring: ratio heuristics and timing evidence combined into one
//! score and level.
//!
//! Each signal contributes a fixed, configurable number of points when it is
//! critical. Signals without enough input report insufficient data and
//! contribute nothing.

pub mod bulk;
pub mod report;
pub mod signals;

pub use bulk::{creation_days, CreationDay};
pub use report::{score, IntervalsView, SuspicionLevel, SuspicionReport};
pub use signals::{Signal, SignalKind};
