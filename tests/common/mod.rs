//! Snapshot fixtures shared by the CLI tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};

fn stars_every(start_minute_of_day: i64, gaps: &[i64]) -> Vec<Value> {
    let mut minute = start_minute_of_day;
    let mut stars = Vec::with_capacity(gaps.len() + 1);
    for (i, gap) in std::iter::once(&0).chain(gaps).enumerate() {
        minute += gap;
        let day = 14 + minute / 1440;
        let hh = (minute % 1440) / 60;
        let mm = minute % 60;
        stars.push(json!({
            "starred_at": format!("2024-11-{day:02}T{hh:02}:{mm:02}:00Z"),
            "user": { "login": format!("user{i}") }
        }));
    }
    stars
}

/// Three launch-day repositories, a bot-driven commit log, and hourly stars at :30.
pub fn farmed() -> Value {
    let mut commits: Vec<Value> = (0..89)
        .map(|i| {
            json!({
                "sha": format!("b{i:03}"),
                "commit": { "message": "Update TIME.md", "author": { "name": "farm", "date": "2024-11-20T00:00:00Z" } }
            })
        })
        .collect();
    commits.extend((0..11).map(|i| {
        json!({
            "sha": format!("h{i:03}"),
            "commit": { "message": "Fix parser edge case\n\nDetails.", "author": { "name": "farm", "date": "2024-11-13T10:00:00Z" } }
        })
    }));

    json!({
        "account": "farm",
        "target": "indie-tools",
        "repositories": [
            { "name": "indie-tools", "stargazers_count": 785, "forks_count": 60, "open_issues_count": 0, "created_at": "2024-11-13T08:00:00Z" },
            { "name": "ai-kit", "stargazers_count": 912, "forks_count": 14, "open_issues_count": 0, "created_at": "2024-11-13T08:05:00Z" },
            { "name": "prompt-lab", "stargazers_count": 716, "forks_count": 9, "open_issues_count": 0, "created_at": "2024-11-13T08:10:00Z" },
            { "name": "dotfiles", "stargazers_count": 3320, "forks_count": 120, "open_issues_count": 52, "created_at": "2020-01-05T12:00:00Z" }
        ],
        "commits": commits,
        "stargazers": stars_every(30, &[60; 59]),
    })
}

/// A small, well-engaged project with irregular stars.
pub fn organic() -> Value {
    let commits: Vec<Value> = (0..50)
        .map(|i| {
            let (message, login) = if i < 2 {
                ("Bump serde from 1.0.1 to 1.0.2", "dependabot[bot]")
            } else {
                ("Handle nested tables", "maintainer")
            };
            json!({
                "sha": format!("c{i:03}"),
                "commit": { "message": message, "author": { "name": login, "date": "2024-01-01T00:00:00Z" } },
                "author": { "login": login }
            })
        })
        .collect();

    json!({
        "account": "maintainer",
        "target": "parser",
        "repositories": [
            { "name": "parser", "stargazers_count": 200, "forks_count": 40, "open_issues_count": 30, "created_at": "2019-04-02T10:00:00Z" },
            { "name": "notes", "stargazers_count": 40, "forks_count": 3, "open_issues_count": 5, "created_at": "2020-08-17T10:00:00Z" }
        ],
        "commits": commits,
        "stargazers": stars_every(17, &[7, 45, 130, 12, 300, 61, 900, 33, 210, 18, 75, 480, 26, 150, 9, 640, 52, 95, 240, 1300]),
    })
}

/// Write `snapshot` into `dir` and return its path.
pub fn write_snapshot(dir: &Path, snapshot: &Value) -> PathBuf {
    let path = dir.join("snapshot.json");
    std::fs::write(&path, serde_json::to_string_pretty(snapshot).unwrap()).unwrap();
    path
}

/// Run the binary inside `dir` so no stray config is picked up.
pub fn starwatch(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_starwatch"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}
