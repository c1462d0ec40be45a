//! Clock-position concentration of stars.
//!
//! Scheduled jobs fire at fixed minutes of the hour and often at fixed hours
//! of the day. Human stars spread across the clock.

use chrono::Timelike;
use serde::Serialize;
use starwatch_core::{SignalStatus, StarEvent, TemporalConfig};

const TOP_OF_HOUR: std::ops::RangeInclusive<u32> = 0..=5;
const HALF_HOUR: std::ops::RangeInclusive<u32> = 25..=35;

/// Where on the clock the stars landed (UTC).
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use starwatch_core::{SignalStatus, StarEvent, TemporalConfig};
/// use starwatch_intervals::TemporalProfile;
///
/// let events: Vec<_> = (0..10)
///     .map(|d| StarEvent::new(Utc.with_ymd_and_hms(2024, 11, 1 + d, 3, 30, 0).unwrap()))
///     .collect();
/// let profile = TemporalProfile::from_events(&events, &TemporalConfig::default()).unwrap();
/// assert_eq!(profile.busiest_hour, 3);
/// assert_eq!(profile.half_hour_fraction, 1.0);
/// assert_eq!(profile.half_hour_status, SignalStatus::Suspicious);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalProfile {
    /// Number of stars considered.
    pub total_events: usize,
    /// Stars per hour of day.
    pub hour_histogram: [usize; 24],
    /// Hour of day with the most stars (lowest hour on ties).
    pub busiest_hour: u32,
    /// Share of stars in the busiest hour.
    pub busiest_hour_fraction: f64,
    /// Share of stars at minutes 0–5.
    pub top_of_hour_fraction: f64,
    /// Share of stars at minutes 25–35.
    pub half_hour_fraction: f64,
    /// Whether the busiest hour is over-represented.
    pub busiest_hour_status: SignalStatus,
    /// Whether the top of the hour is over-represented.
    pub top_of_hour_status: SignalStatus,
    /// Whether the half hour is over-represented.
    pub half_hour_status: SignalStatus,
}

impl TemporalProfile {
    /// Build the profile; `None` when there are no events.
    pub fn from_events(events: &[StarEvent], config: &TemporalConfig) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        let total = events.len() as f64;

        let mut hour_histogram = [0usize; 24];
        let mut top_of_hour = 0usize;
        let mut half_hour = 0usize;
        for event in events {
            hour_histogram[event.timestamp.hour() as usize] += 1;
            let minute = event.timestamp.minute();
            if TOP_OF_HOUR.contains(&minute) {
                top_of_hour += 1;
            } else if HALF_HOUR.contains(&minute) {
                half_hour += 1;
            }
        }

        let (busiest_hour, busiest_count) = hour_histogram
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |best, (hour, &count)| {
                if count > best.1 {
                    (hour, count)
                } else {
                    best
                }
            });

        let busiest_hour_fraction = busiest_count as f64 / total;
        let top_of_hour_fraction = top_of_hour as f64 / total;
        let half_hour_fraction = half_hour as f64 / total;

        Some(Self {
            total_events: events.len(),
            hour_histogram,
            busiest_hour: busiest_hour as u32,
            busiest_hour_fraction,
            top_of_hour_fraction,
            half_hour_fraction,
            busiest_hour_status: flag(busiest_hour_fraction, config.hour_concentration_threshold),
            top_of_hour_status: flag(top_of_hour_fraction, config.concentration_threshold),
            half_hour_status: flag(half_hour_fraction, config.concentration_threshold),
        })
    }
}

fn flag(fraction: f64, threshold: f64) -> SignalStatus {
    if fraction > threshold {
        SignalStatus::Suspicious
    } else {
        SignalStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> StarEvent {
        StarEvent::new(Utc.with_ymd_and_hms(2024, 11, 13, hour, minute, 0).unwrap())
    }

    #[test]
    fn empty_history_has_no_profile() {
        assert!(TemporalProfile::from_events(&[], &TemporalConfig::default()).is_none());
    }

    #[test]
    fn spread_stars_are_not_flagged() {
        // One star per hour at minute 15: 24 stars, no hour above 15 %.
        let events: Vec<_> = (0..24).map(|h| at(h, 15)).collect();
        let profile = TemporalProfile::from_events(&events, &TemporalConfig::default()).unwrap();
        assert_eq!(profile.busiest_hour, 0);
        assert_eq!(profile.busiest_hour_status, SignalStatus::Ok);
        assert_eq!(profile.top_of_hour_status, SignalStatus::Ok);
        assert_eq!(profile.half_hour_status, SignalStatus::Ok);
        assert_eq!(profile.hour_histogram.iter().sum::<usize>(), 24);
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let events = vec![at(1, 0), at(1, 5), at(1, 6), at(1, 24), at(1, 25), at(1, 35), at(1, 36)];
        let profile = TemporalProfile::from_events(&events, &TemporalConfig::default()).unwrap();
        assert!((profile.top_of_hour_fraction - 2.0 / 7.0).abs() < 1e-12);
        assert!((profile.half_hour_fraction - 2.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn top_of_hour_burst_is_flagged() {
        let mut events: Vec<_> = (0..6).map(|h| at(h, 2)).collect();
        events.extend((6..16).map(|h| at(h, 45)));
        let profile = TemporalProfile::from_events(&events, &TemporalConfig::default()).unwrap();
        assert_eq!(profile.top_of_hour_fraction, 6.0 / 16.0);
        assert_eq!(profile.top_of_hour_status, SignalStatus::Suspicious);
        assert_eq!(profile.half_hour_status, SignalStatus::Ok);
    }

    #[test]
    fn busiest_hour_concentration() {
        let mut events: Vec<_> = (0..4).map(|m| at(22, m * 10 + 7)).collect();
        events.extend((0..6).map(|h| at(h, 47)));
        let profile = TemporalProfile::from_events(&events, &TemporalConfig::default()).unwrap();
        assert_eq!(profile.busiest_hour, 22);
        assert_eq!(profile.busiest_hour_fraction, 0.4);
        assert_eq!(profile.busiest_hour_status, SignalStatus::Suspicious);
    }
}
