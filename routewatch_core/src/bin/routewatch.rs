use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use routewatch_core::diff::DiffEngine;
use routewatch_core::history::HistoryWalker;
use routewatch_core::pipeline::{Pipeline, PipelineOptions};
use routewatch_core::query::{RouteQuery, DEFAULT_QUERY_BIN};
use routewatch_core::report::{format_timestamp, ReportAccumulator};
use routewatch_core::revisions::{BackendKind, RevisionReader, DEFAULT_REVISION_COUNT};
use routewatch_core::routes::RouteSet;
use routewatch_core::{Comparison, HistoryEntry};

/// routewatch generates BGP prefix filters and tracks how they change over time.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Version-control backend used for history: git, libgit2 or none
    #[clap(long, default_value = "git", global = true)]
    backend: BackendKind,

    /// Timeout in seconds for every external command
    #[clap(long, default_value_t = 30, global = true)]
    timeout: u64,

    /// More log output (repeatable)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate, merge and diff every configuration file
    Run(RunArgs),
    /// Show the change history of one artifact
    History {
        /// Artifact to inspect
        #[clap(name = "FILE")]
        file: Utf8PathBuf,
        /// Number of historical revisions to compare
        #[clap(short = 'n', long, default_value_t = DEFAULT_REVISION_COUNT)]
        count: usize,
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
    /// Compare the route sets of two filter files
    Diff {
        /// Older file
        #[clap(name = "OLD")]
        old: Utf8PathBuf,
        /// Newer file
        #[clap(name = "NEW")]
        new: Utf8PathBuf,
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
    /// Print the canonical route set of a filter file
    Parse {
        /// Filter file to parse
        #[clap(name = "FILE")]
        file: Utf8PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Directory holding the *.toml configuration files
    #[clap(short, long, default_value = "config")]
    config_dir: Utf8PathBuf,

    /// Directory receiving generated artifacts
    #[clap(short, long, default_value = "output")]
    output_dir: Utf8PathBuf,

    /// Directory receiving JSON reports
    #[clap(short, long, default_value = "reports")]
    report_dir: Utf8PathBuf,

    /// Number of historical revisions compared per artifact
    #[clap(short = 'n', long, default_value_t = DEFAULT_REVISION_COUNT)]
    history_count: usize,

    /// Route-query binary
    #[clap(long, default_value = DEFAULT_QUERY_BIN)]
    bgpq4: String,

    /// Reuse existing artifacts instead of querying
    #[clap(long)]
    skip_generate: bool,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(log_level(opts.verbose, opts.quiet))
        .parse_default_env()
        .init();

    let timeout = Duration::from_secs(opts.timeout);
    match opts.command {
        Command::Run(args) => run(&args, opts.backend, timeout),
        Command::History { file, count, json } => {
            let start = file.parent().filter(|dir| !dir.as_str().is_empty());
            let backend = opts.backend.open_or_none(
                start.unwrap_or_else(|| Utf8Path::new(".")).as_std_path(),
                timeout,
            );
            let walker = HistoryWalker::new(RevisionReader::new(backend));
            let history = walker.build_history(file.as_std_path(), count);
            print_history(&file, &history, json)
        }
        Command::Diff { old, new, json } => {
            let old_text =
                fs::read_to_string(&old).with_context(|| format!("failed to read {old}"))?;
            let new_text =
                fs::read_to_string(&new).with_context(|| format!("failed to read {new}"))?;
            let comparison = DiffEngine::new().compare(&old_text, &new_text);
            print_comparison(&comparison, json)
        }
        Command::Parse { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("failed to read {file}"))?;
            for prefix in &RouteSet::parse(&text) {
                println!("{prefix}");
            }
            Ok(())
        }
    }
}

fn run(args: &RunArgs, backend: BackendKind, timeout: Duration) -> Result<()> {
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir))?;

    let backend = backend.open_or_none(args.output_dir.as_std_path(), timeout);
    let walker = HistoryWalker::new(RevisionReader::new(backend));
    let options = PipelineOptions {
        output_dir: args.output_dir.clone().into_std_path_buf(),
        revision_count: args.history_count,
        generate: !args.skip_generate,
    };
    let pipeline = Pipeline::new(options, RouteQuery::new(&args.bgpq4, timeout), walker);

    let mut reports = ReportAccumulator::new();
    let processed = pipeline
        .run(args.config_dir.as_std_path(), &mut reports)
        .with_context(|| format!("failed to read configuration directory {}", args.config_dir))?;

    print!("{}", reports.summary());
    reports
        .write_json(args.report_dir.as_std_path())
        .with_context(|| format!("failed to write reports to {}", args.report_dir))?;

    log::info!(
        "processed {processed} configuration file(s); reports in {}",
        args.report_dir
    );
    Ok(())
}

fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    match 2 + i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-1 => LevelFilter::Off,
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn print_history(file: &Utf8Path, history: &[HistoryEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("{file}: no history available");
        return Ok(());
    }

    println!("{file}");
    for entry in history {
        let stats = entry.comparison.stats();
        println!(
            "{:<8}  {}  {:<20}  {} → {}  +{}  -{}  {}",
            entry.revision.short_id(),
            format_timestamp(entry.revision.timestamp()),
            entry.revision.author(),
            stats.old_count,
            stats.new_count,
            stats.added,
            stats.removed,
            entry.revision.message()
        );
        for prefix in &entry.comparison.added {
            println!("    + {prefix}");
        }
        for prefix in &entry.comparison.removed {
            println!("    - {prefix}");
        }
    }
    Ok(())
}

fn print_comparison(comparison: &Comparison, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(comparison)?);
        return Ok(());
    }

    for prefix in &comparison.added {
        println!("+ {prefix}");
    }
    for prefix in &comparison.removed {
        println!("- {prefix}");
    }
    let stats = comparison.stats();
    println!(
        "{} → {}  +{}  -{}  ({} unchanged)",
        stats.old_count,
        stats.new_count,
        stats.added,
        stats.removed,
        comparison.unchanged.len()
    );
    Ok(())
}
