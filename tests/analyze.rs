mod common;

use serde_json::Value;

fn stdout(output: &std::process::Output) -> String {
    assert!(
        output.status.success(),
        "starwatch failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn analyze_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());

    let out = stdout(&common::starwatch(dir.path(), &["analyze", snapshot.to_str().unwrap()]));
    assert!(out.contains("Suspicion Report: farm/indie-tools"));
    assert!(out.contains("Score: 150/150 (High)"));
    assert!(out.contains("89 of 100 commits are automated"));
    assert!(out.contains("Bulk creation on 2024-11-13"));
}

#[test]
fn analyze_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());

    let out = stdout(&common::starwatch(
        dir.path(),
        &["analyze", snapshot.to_str().unwrap(), "--format", "json"],
    ));
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["score"], 150);
    assert_eq!(json["level"], "high");
    assert_eq!(json["botCommitRatio"], 0.89);
    assert_eq!(json["bulkCreationFlags"][0]["combinedStars"], 2413);
    assert_eq!(json["clusters"][0]["memberCount"], 59);
    assert_eq!(json["temporal"]["halfHourFraction"], 1.0);
}

#[test]
fn analyze_markdown_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::organic());

    let out = stdout(&common::starwatch(
        dir.path(),
        &["analyze", snapshot.to_str().unwrap(), "--format", "markdown"],
    ));
    assert!(out.starts_with("# Suspicion Report: maintainer/parser"));
    assert!(out.contains("| Bot commits | 4.00% | > 85.00% | OK | 0 |"));
    assert!(out.contains("## Star intervals"));
}

#[test]
fn local_config_changes_weights() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());
    std::fs::write(
        dir.path().join(".starwatch.toml"),
        "[scoring]\nclustering_points = 0\nhalf_hour_points = 0\n",
    )
    .unwrap();

    let out = stdout(&common::starwatch(
        dir.path(),
        &["analyze", snapshot.to_str().unwrap(), "--format", "json"],
    ));
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["score"], 100);
    assert_eq!(json["maxScore"], 100);
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());

    let output = common::starwatch(
        dir.path(),
        &[
            "analyze",
            snapshot.to_str().unwrap(),
            "--config",
            "missing.toml",
        ],
    );
    assert!(!output.status.success());
}

#[test]
fn missing_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = common::starwatch(dir.path(), &["analyze", "nope.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}

#[test]
fn intervals_command_reports_timing_only() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());

    let out = stdout(&common::starwatch(
        dir.path(),
        &["intervals", snapshot.to_str().unwrap()],
    ));
    assert!(out.contains("Star Timing: farm/indie-tools (60 stars)"));
    assert!(out.contains("59 gaps, 1 cluster(s), 0 outlier(s)"));
    assert!(out.contains("Automation score: 50/100 (evident automation pattern)"));
    assert!(out.contains("  - regular interval pattern: 60.0 ± 0.0 min over 59 gaps"));
    assert!(!out.contains("Score:"));

    let json_out = stdout(&common::starwatch(
        dir.path(),
        &["intervals", snapshot.to_str().unwrap(), "--format", "json"],
    ));
    let json: Value = serde_json::from_str(&json_out).unwrap();
    assert_eq!(json["stars"], 60);
    assert_eq!(json["intervals"]["status"], "clustered");
    assert_eq!(json["automation"]["score"], 50);
    assert_eq!(json["automation"]["verdict"], "evident");
    assert_eq!(json["automation"]["evidence"].as_array().unwrap().len(), 2);
}

#[test]
fn intervals_automation_weights_come_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());
    std::fs::write(
        dir.path().join(".starwatch.toml"),
        "[temporal]\nregular_cluster_points = 65\n",
    )
    .unwrap();

    let out = stdout(&common::starwatch(
        dir.path(),
        &["intervals", snapshot.to_str().unwrap(), "--format", "markdown"],
    ));
    assert!(out.contains("## Automation"));
    assert!(out.contains("**Automation score:** 75/125 (high likelihood of automation)"));
}

#[test]
fn no_merges_requires_a_clone() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = common::write_snapshot(dir.path(), &common::farmed());

    let output = common::starwatch(
        dir.path(),
        &["analyze", snapshot.to_str().unwrap(), "--no-merges"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--git"));
}

#[test]
fn intervals_degrade_on_single_star() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = common::organic();
    snapshot["stargazers"] = serde_json::json!([
        { "starred_at": "2024-11-14T00:17:00Z", "user": { "login": "only" } }
    ]);
    let path = common::write_snapshot(dir.path(), &snapshot);

    let out = stdout(&common::starwatch(dir.path(), &["intervals", path.to_str().unwrap()]));
    assert!(out.contains("insufficient data: 1 star event(s), need at least 2"));
}

#[test]
fn completions_are_generated() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(&common::starwatch(dir.path(), &["completions", "bash"]));
    assert!(out.contains("starwatch"));
}
