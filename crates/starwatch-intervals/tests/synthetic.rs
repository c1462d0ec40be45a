//! End-to-end interval analysis on synthetic star histories.

use chrono::{DateTime, Duration, TimeZone, Utc};
use starwatch_core::{IntervalConfig, Regularity, StarEvent, TemporalConfig};
use starwatch_intervals::{
    analyze_intervals, AutomationAssessment, AutomationVerdict, IntervalAnalysis,
    InsufficientReason,
};

fn events_spaced(gaps: &[i64], unit: fn(i64) -> Duration) -> Vec<StarEvent> {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 11, 13, 0, 0, 0).unwrap();
    let mut events = vec![StarEvent::new(start)];
    let mut t = start;
    for gap in gaps {
        t += unit(*gap);
        events.push(StarEvent::new(t));
    }
    events
}

fn events_from_gaps(gaps_minutes: &[i64]) -> Vec<StarEvent> {
    events_spaced(gaps_minutes, Duration::minutes)
}

/// 44 × 4 min, 36 × 25 min, 17 gaps around an hour, 2 stragglers: 99 gaps.
fn scripted_gaps() -> Vec<i64> {
    let mut gaps = interleave(vec![4; 44], vec![25; 36], (55..=71).collect());
    gaps.insert(10, 600);
    gaps.push(1440);
    gaps
}

/// Symmetric offsets ±5, ±15, ... seconds around `center`, alternating sign.
fn jittered(center: i64, count: usize) -> Vec<i64> {
    (0..count as i64)
        .map(|i| {
            let offset = 5 + 10 * (i / 2);
            if i % 2 == 0 {
                center + offset
            } else {
                center - offset
            }
        })
        .collect()
}

/// Same schedule as [`scripted_gaps`] in seconds, with jitter: 44 gaps of
/// 4.3 ± 3.6 min, 36 gaps of 25 ± 2.9 min, 17 around an hour, 2 stragglers.
fn noisy_gaps_seconds() -> Vec<i64> {
    let mut gaps = interleave(
        jittered(258, 44),
        jittered(1500, 36),
        (55..=71).map(|m| m * 60).collect(),
    );
    gaps.insert(10, 600 * 60);
    gaps.push(1440 * 60);
    gaps
}

/// Alternate bursts: three fast gaps, two medium gaps, one slow gap.
fn interleave(fast: Vec<i64>, medium: Vec<i64>, slow: Vec<i64>) -> Vec<i64> {
    let mut fast = fast.into_iter();
    let mut medium = medium.into_iter();
    let mut slow = slow.into_iter();

    let mut gaps = Vec::new();
    loop {
        let mut progressed = false;
        for _ in 0..3 {
            if let Some(g) = fast.next() {
                gaps.push(g);
                progressed = true;
            }
        }
        for _ in 0..2 {
            if let Some(g) = medium.next() {
                gaps.push(g);
                progressed = true;
            }
        }
        if let Some(g) = slow.next() {
            gaps.push(g);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }
    gaps
}

#[test]
fn recovers_two_dominant_schedules() {
    let gaps = scripted_gaps();
    assert_eq!(gaps.len(), 99);

    let analysis = analyze_intervals(&events_from_gaps(&gaps), &IntervalConfig::default());
    let summary = analysis.summary().expect("99 gaps should be analyzed");

    assert_eq!(summary.total_gaps, 99);
    assert!(summary.outliers.len() <= 2, "outliers: {:?}", summary.outliers);

    let first = &summary.clusters[0];
    assert_eq!(first.member_count, 44);
    assert!((first.fraction_of_total * 100.0 - 44.4).abs() < 0.1);
    assert!((first.mean_interval - 4.0).abs() < 1e-9);
    assert_eq!(first.regularity, Regularity::HighlyRegular);

    let second = &summary.clusters[1];
    assert_eq!(second.member_count, 36);
    assert!((second.fraction_of_total * 100.0 - 36.4).abs() < 0.1);
    assert!((second.mean_interval - 25.0).abs() < 1e-9);
}

#[test]
fn recovers_schedules_under_jitter() {
    let gaps = noisy_gaps_seconds();
    assert_eq!(gaps.len(), 99);

    let events = events_spaced(&gaps, Duration::seconds);
    let analysis = analyze_intervals(&events, &IntervalConfig::default());
    let summary = analysis.summary().expect("99 gaps should be analyzed");

    assert_eq!(summary.total_gaps, 99);
    assert_eq!(summary.outliers, vec![600.0, 1440.0]);
    assert_eq!(summary.clusters.len(), 3);

    let first = &summary.clusters[0];
    assert_eq!(first.member_count, 44);
    assert!((first.mean_interval - 4.3).abs() < 1e-6, "{}", first.mean_interval);
    assert!(first.std_dev > 2.0 && first.std_dev < 2.2, "{}", first.std_dev);
    assert!(first.min_interval < 1.0 && first.max_interval > 7.5);
    assert_eq!(first.regularity, Regularity::HighlyRegular);

    let second = &summary.clusters[1];
    assert_eq!(second.member_count, 36);
    assert!((second.mean_interval - 25.0).abs() < 1e-6);
    assert_eq!(second.regularity, Regularity::HighlyRegular);

    assert_eq!(summary.clusters[2].member_count, 17);
    assert!((summary.clusters[2].mean_interval - 63.0).abs() < 1e-6);

    let automation = AutomationAssessment::assess(Some(summary), None, &TemporalConfig::default());
    assert_eq!(automation.score, 50);
    assert_eq!(automation.verdict, AutomationVerdict::Evident);
}

#[test]
fn fractions_never_exceed_one() {
    // Deterministic pseudo-random gap sets of varying shape.
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as i64
    };

    for round in 0..50 {
        let len = 2 + (next() % 200) as usize;
        let spread = 1 + round * 7;
        let gaps: Vec<i64> = (0..len).map(|_| next() % spread).collect();
        let events = events_from_gaps(&gaps);

        let summary = match analyze_intervals(&events, &IntervalConfig::default()) {
            IntervalAnalysis::Clustered(summary) => summary,
            IntervalAnalysis::InsufficientData { reason } => panic!("unexpected {reason}"),
        };
        let clustered = summary.clustered_fraction();
        assert!(clustered <= 1.0 + 1e-9, "round {round}: {clustered}");
        assert!(
            (clustered + summary.outlier_fraction - 1.0).abs() < 1e-9,
            "round {round}: clusters and outliers must cover every gap"
        );
    }
}

#[test]
fn degrades_on_tiny_history() {
    let analysis = analyze_intervals(&events_from_gaps(&[]), &IntervalConfig::default());
    match analysis {
        IntervalAnalysis::InsufficientData { reason } => {
            assert_eq!(reason, InsufficientReason::TooFewEvents { count: 1 });
        }
        IntervalAnalysis::Clustered(_) => panic!("one event cannot be clustered"),
    }
}

#[test]
fn degrades_on_unsorted_history() {
    let mut events = events_from_gaps(&[4, 4, 4]);
    events.swap(1, 3);
    let analysis = analyze_intervals(&events, &IntervalConfig::default());
    assert!(matches!(
        analysis,
        IntervalAnalysis::InsufficientData {
            reason: InsufficientReason::NotChronological { .. }
        }
    ));
}

#[test]
fn json_shape_is_tagged() {
    let analysis = analyze_intervals(&events_from_gaps(&[4, 4, 4]), &IntervalConfig::default());
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["status"], "clustered");
    assert_eq!(json["totalGaps"], 3);
    assert_eq!(json["clusters"][0]["memberCount"], 3);

    let insufficient = analyze_intervals(&[], &IntervalConfig::default());
    let json = serde_json::to_value(&insufficient).unwrap();
    assert_eq!(json["status"], "insufficient-data");
    assert_eq!(json["reason"]["kind"], "too-few-events");
}
