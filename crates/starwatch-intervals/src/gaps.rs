//! Inter-arrival gaps between consecutive stars.

use std::fmt;

use serde::Serialize;
use starwatch_core::StarEvent;

/// Why a star history cannot be analyzed.
///
/// # Examples
///
/// ```
/// use starwatch_intervals::InsufficientReason;
///
/// let reason = InsufficientReason::TooFewEvents { count: 1 };
/// assert_eq!(reason.to_string(), "insufficient data: 1 star event(s), need at least 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InsufficientReason {
    /// Fewer than two events, so there are no gaps.
    TooFewEvents {
        /// Number of events supplied.
        count: usize,
    },
    /// An event is earlier than the one before it.
    NotChronological {
        /// Position of the first out-of-order event.
        index: usize,
    },
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientReason::TooFewEvents { count } => write!(
                f,
                "insufficient data: {count} star event(s), need at least 2"
            ),
            InsufficientReason::NotChronological { index } => write!(
                f,
                "insufficient data: star event {index} is earlier than its predecessor"
            ),
        }
    }
}

/// Gaps between consecutive events, in minutes.
///
/// Events must already be chronological; equal timestamps produce a zero gap.
///
/// # Errors
///
/// Returns an [`InsufficientReason`] when there are fewer than two events or
/// the events are out of order.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use starwatch_core::StarEvent;
/// use starwatch_intervals::gaps_in_minutes;
///
/// let at = |h, m, s| StarEvent::new(Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap());
/// let gaps = gaps_in_minutes(&[at(0, 0, 0), at(0, 4, 30), at(0, 29, 30)]).unwrap();
/// assert_eq!(gaps, vec![4.5, 25.0]);
/// ```
pub fn gaps_in_minutes(events: &[StarEvent]) -> Result<Vec<f64>, InsufficientReason> {
    if events.len() < 2 {
        return Err(InsufficientReason::TooFewEvents {
            count: events.len(),
        });
    }

    let mut gaps = Vec::with_capacity(events.len() - 1);
    for (i, pair) in events.windows(2).enumerate() {
        let delta = pair[1].timestamp - pair[0].timestamp;
        let millis = delta.num_milliseconds();
        if millis < 0 {
            return Err(InsufficientReason::NotChronological { index: i + 1 });
        }
        gaps.push(millis as f64 / 60_000.0);
    }
    Ok(gaps)
}
