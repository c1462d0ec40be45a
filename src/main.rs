use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::{debug, info};

use starwatch_collect::bots::BotMatcher;
use starwatch_collect::mining::{mine_commit_stats, MiningOptions};
use starwatch_collect::snapshot::Snapshot;
use starwatch_collect::{Collection, Collector};
use starwatch_core::{OutputFormat, StarwatchConfig};
use starwatch_intervals::{analyze_intervals, AutomationAssessment, TemporalProfile};
use starwatch_score::{IntervalsView, SuspicionLevel};

#[derive(Parser)]
#[command(
    name = "starwatch",
    version,
    about = "Detect star manipulation on GitHub repositories",
    long_about = "Starwatch scores a repository snapshot for signs of star manipulation.\n\n\
                   It combines engagement ratios (issues, forks, bot commits, bulk\n\
                   repository creation) with the timing of stars: scripted stars arrive\n\
                   on a schedule and pile up at fixed minutes of the hour.\n\n\
                   Examples:\n  \
                     starwatch analyze snapshot.json              Full suspicion report\n  \
                     starwatch analyze snapshot.json --git ./repo Recount commits from a clone\n  \
                     starwatch intervals snapshot.json            Star timing only\n  \
                     starwatch init                               Write a default .starwatch.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .starwatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Exit with code 1 when the suspicion level reaches this (low, medium, high)
    #[arg(
        long,
        global = true,
        long_help = "Exit with non-zero code if the suspicion level is at or above this level.\n\n\
                       Level ranking: high > medium > low.\n\
                       Useful in CI pipelines that vet dependencies."
    )]
    fail_on: Option<SuspicionLevel>,
}

#[derive(Subcommand)]
enum Command {
    /// Score a repository snapshot for star manipulation
    #[command(long_about = "Score a repository snapshot for star manipulation.\n\n\
        Reads a JSON snapshot of the account's repositories, the target's recent commits,\n\
        and its stargazers with timestamps. Every signal is reported with its value,\n\
        threshold, status, and points.\n\n\
        Examples:\n  starwatch analyze snapshot.json\n  starwatch analyze snapshot.json --git ../indie-tools --fail-on medium")]
    Analyze {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Local clone of the target; commits are counted from it instead of the snapshot
        #[arg(long)]
        git: Option<PathBuf>,

        /// Branch to walk in the clone (default: HEAD)
        #[arg(long, requires = "git")]
        branch: Option<String>,

        /// Skip merge commits when walking the clone
        #[arg(long, requires = "git")]
        no_merges: bool,
    },
    /// Cluster inter-star gaps and profile clock positions
    #[command(long_about = "Cluster inter-star gaps and profile clock positions.\n\n\
        Computes gaps between consecutive stars in minutes, groups them with\n\
        agglomerative clustering, and reports how stars concentrate by hour and minute.\n\n\
        Examples:\n  starwatch intervals snapshot.json\n  starwatch intervals snapshot.json --format json")]
    Intervals {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },
    /// Write a default .starwatch.toml to the current directory
    Init,
    /// Generate shell completions
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Starwatch Configuration
# See: https://github.com/Meru143/starwatch

[intervals]
# Gaps closer than this many minutes are merged into one cluster
# distance_threshold = 10.0
# max_clusters = 8
# min_cluster_size = 3
# linkage = "centroid"   # or "ward"
# zscore_threshold = 2.0

[temporal]
# concentration_threshold = 0.20
# hour_concentration_threshold = 0.15
# Automation assessment weights and verdict cut-offs
# regular_cluster_points = 40
# loose_cluster_points = 20
# top_of_hour_points = 30
# busy_hour_points = 20
# few_patterns_points = 10
# few_patterns_max_clusters = 3
# automation_high_level = 70
# automation_evident_level = 50

[scoring]
# issue_rate_threshold = 0.01
# issue_rate_points = 30
# fork_rate_threshold = 0.10
# fork_min_stars = 100
# fork_rate_points = 25
# bot_commit_threshold = 0.85
# bot_commit_points = 25
# bulk_min_repos = 3
# bulk_min_repo_stars = 50
# bulk_min_combined_stars = 1000
# bulk_creation_points = 20
# clustering_points = 40
# half_hour_points = 10
# high_level = 80
# medium_level = 50

[bots]
# message_patterns = ["Update TIME.md*"]
# author_suffixes = ["[bot]"]

[commits]
# sample_size = 100
# include_merges = true
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Analyze {
            ref snapshot,
            ref git,
            ref branch,
            no_merges,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if no_merges {
                config.commits.include_merges = false;
            }
            let collection = collect(snapshot, &config, git.as_deref(), branch.clone())?;

            let intervals = analyze_intervals(&collection.stars, &config.intervals);
            let temporal = TemporalProfile::from_events(&collection.stars, &config.temporal);
            let report = starwatch_score::score(
                &collection.account,
                &collection.target,
                intervals,
                temporal,
                &config,
            );

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print!("{}", report.to_markdown()),
                OutputFormat::Text => print!("{report}"),
            }

            if let Some(threshold) = cli.fail_on {
                if report.level.meets_threshold(threshold) {
                    info!(level = %report.level, %threshold, "suspicion level reached --fail-on");
                    std::process::exit(1);
                }
            }
        }
        Command::Intervals { ref snapshot } => {
            let config = load_config(cli.config.as_deref())?;
            let collection = collect(snapshot, &config, None, None)?;

            let intervals = analyze_intervals(&collection.stars, &config.intervals);
            let temporal = TemporalProfile::from_events(&collection.stars, &config.temporal);
            let automation =
                AutomationAssessment::assess(intervals.summary(), temporal.as_ref(), &config.temporal);
            let view = IntervalsView::new(&intervals, temporal.as_ref()).with_automation(&automation);

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "account": collection.account.login,
                        "target": collection.target.name,
                        "stars": collection.stars.len(),
                        "intervals": intervals,
                        "temporal": temporal,
                        "automation": automation,
                    });
                    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!(
                        "# Star Timing: {}/{}\n",
                        collection.account.login, collection.target.name
                    );
                    print!("{}", view.to_markdown());
                }
                OutputFormat::Text => {
                    println!(
                        "Star Timing: {}/{} ({} stars)\n",
                        collection.account.login,
                        collection.target.name,
                        collection.stars.len()
                    );
                    print!("{view}");
                }
            }
        }
        Command::Init => {
            let path = Path::new(".starwatch.toml");
            if path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file, or remove it and run 'starwatch init' again",
                    ".starwatch.toml already exists"
                ));
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .starwatch.toml with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "starwatch", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// `--config` first, then `./.starwatch.toml`, then built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<StarwatchConfig> {
    let config = match explicit {
        Some(path) => StarwatchConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".starwatch.toml");
            if default_path.exists() {
                StarwatchConfig::from_file(default_path)?
            } else {
                StarwatchConfig::default()
            }
        }
    };
    debug!(
        linkage = %config.intervals.linkage,
        distance_threshold = config.intervals.distance_threshold,
        max_score = config.scoring.max_score(),
        "configuration loaded"
    );
    Ok(config)
}

fn collect(
    snapshot: &Path,
    config: &StarwatchConfig,
    git: Option<&Path>,
    branch: Option<String>,
) -> Result<Collection> {
    let bots = BotMatcher::new(&config.bots)?;
    let collection = Snapshot::from_file(snapshot)?.collect(&bots, config.commits.sample_size)?;

    let Some(repo) = git else {
        return Ok(collection);
    };
    let options = MiningOptions {
        sample_size: config.commits.sample_size,
        branch,
        include_merges: config.commits.include_merges,
    };
    let stats = mine_commit_stats(repo, &bots, &options)?;
    debug!(
        total = stats.total,
        bot = stats.bot,
        include_merges = options.include_merges,
        "commit counts replaced from local clone"
    );
    Ok(collection.with_commit_stats(stats))
}
