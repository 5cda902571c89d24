//! `favhunt`: favicon fingerprints and search-export triage for origin IP discovery.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. `hash`: resolve every target to icon bytes ([`favicon::resolver`]), fingerprint
//!    them ([`favicon::hash`]) and print the Shodan / FOFA / ZoomEye queries.
//!    Exit `1` when any target could not be resolved.
//! 3. `triage`: read the CSV export ([`triage::dataset`]), label each row
//!    ([`triage::classifier`]) and render the requested report ([`report`]).

mod cli;
mod config;
mod errors;
mod favicon;
mod models;
mod report;
mod triage;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, HashArgs, HashFormat, TriageArgs, TriageFormat};
use config::{load_config, Config};
use favicon::fetch::HttpFetcher;
use favicon::resolver::{AssetSource, Resolver};
use models::HashOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let work_dir = std::env::current_dir()?;
    let config = load_config(&work_dir, cli.config.as_deref())?;

    match cli.command {
        Command::Hash(args) => run_hash(&config, &args).await,
        Command::Triage(args) => run_triage(&config, &args),
    }
}

async fn run_hash(config: &Config, args: &HashArgs) -> Result<()> {
    let sources = args.sources();
    let fetcher = HttpFetcher::new(&config.http)?;
    let fallback = if args.no_fallback {
        None
    } else {
        Some(config.http.fallback_path.clone())
    };
    let resolver = Resolver::new(&fetcher, fallback);

    let fetching = sources.iter().any(|s| matches!(s, AssetSource::Url(_)));
    let spinner = if fetching && !args.quiet && matches!(args.report, HashFormat::Terminal) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Fetching {} target(s)...", sources.len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    // Each target resolves independently; output keeps argument order.
    let resolutions = join_all(sources.iter().map(|source| resolver.resolve(source))).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let outcomes: Vec<HashOutcome> = sources
        .iter()
        .zip(resolutions)
        .map(|(source, resolution)| HashOutcome::from_resolution(source.to_string(), resolution))
        .collect();

    match args.report {
        HashFormat::Terminal => report::terminal::render_hashes(&outcomes, args.quiet),
        HashFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        if !args.quiet {
            eprintln!(
                "{} Failed to retrieve favicon data for {} of {} target(s).",
                "[-]".red().bold(),
                failed,
                outcomes.len()
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_triage(config: &Config, args: &TriageArgs) -> Result<()> {
    let registries = config.registries.to_registries();

    if !args.quiet && matches!(args.report, TriageFormat::Terminal) {
        eprintln!("  {} Analyzing {}...", "→".cyan(), args.file.display());
    }

    let rows = triage::dataset::read_path(&args.file)?;
    let report = triage::classifier::triage(rows, &registries);

    match args.report {
        TriageFormat::Terminal => report::terminal::render_triage(
            &report,
            &args.file,
            &registries,
            args.verbose,
            args.quiet,
        )?,
        TriageFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        TriageFormat::Csv => report::csv::render(&report, std::io::stdout().lock())?,
    }

    Ok(())
}
