//! NeuroEase CLI - strategy ratings and offline cache
//!
//! Drives the rating aggregator against a local store, manages the expiring
//! cache, and probes network reachability.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use neuroease::cache::{ExpiringCache, FileStorage};
use neuroease::cli::{CacheCommand, Cli, Command, CommunityArgs, RateCommand, RuntimeConfig};
use neuroease::connectivity::{ConnectivityMonitor, HttpProbe};
use neuroease::error::NeuroEaseError;
use neuroease::logging;
use neuroease::rating::{
    parse_community_value, parse_effectiveness_value, CommunityStats, CopingStats,
};
use neuroease::store::LocalStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, NeuroEaseError> {
    let config = RuntimeConfig::from_cli(&cli)?;
    logging::init(config.verbosity)?;
    debug!(?config, "starting");

    match cli.command {
        Command::Rate(RateCommand::Community(args)) => rate_community(&config, args),
        Command::Rate(RateCommand::Effectiveness { subject, value }) => {
            rate_effectiveness(&config, &subject, &value)
        }
        Command::Show { subject } => show(&config, &subject),
        Command::Cache(command) => run_cache(&config, command),
        Command::Status => status(&config).await,
    }
}

fn rate_community(config: &RuntimeConfig, args: CommunityArgs) -> Result<ExitCode, NeuroEaseError> {
    let value = parse_community_value(&args.value)?;
    let store = LocalStore::new(config.data_dir.clone());
    let mut state = store.load()?;

    let score = state.community.submit_community_rating_with_feedback(
        &args.subject,
        &args.rater,
        value,
        args.feedback.as_deref(),
    )?;
    store.save(&state)?;

    print_json(&CommunityStats::from(&score))?;
    Ok(ExitCode::SUCCESS)
}

fn rate_effectiveness(
    config: &RuntimeConfig,
    subject: &str,
    raw_value: &str,
) -> Result<ExitCode, NeuroEaseError> {
    let value = parse_effectiveness_value(raw_value)?;
    let store = LocalStore::new(config.data_dir.clone());
    let mut state = store.load()?;

    let score = state
        .effectiveness
        .submit_effectiveness_rating(subject, value)?;
    store.save(&state)?;

    print_json(&CopingStats::from(&score))?;
    Ok(ExitCode::SUCCESS)
}

fn show(config: &RuntimeConfig, subject: &str) -> Result<ExitCode, NeuroEaseError> {
    let state = LocalStore::new(config.data_dir.clone()).load()?;

    let community = state.community.score(subject).map(|s| CommunityStats::from(&s));
    let coping = state
        .effectiveness
        .score(subject)
        .map(|s| CopingStats::from(&s));

    print_json(&json!({
        "subject_id": subject,
        "community": community,
        "ratings": state.community.records(subject),
        "effectiveness": coping,
    }))?;
    Ok(ExitCode::SUCCESS)
}

fn run_cache(config: &RuntimeConfig, command: CacheCommand) -> Result<ExitCode, NeuroEaseError> {
    let cache = ExpiringCache::new(FileStorage::at(config.cache_file.clone()));

    match command {
        CacheCommand::Put {
            key,
            payload,
            ttl_secs,
        } => {
            let payload: Value = serde_json::from_str(&payload)?;
            cache.put(&key, &payload, Duration::from_secs(ttl_secs));
            Ok(ExitCode::SUCCESS)
        }
        CacheCommand::Get { key } => match cache.get::<Value>(&key) {
            Some(payload) => {
                print_json(&payload)?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("absent");
                Ok(ExitCode::FAILURE)
            }
        },
        CacheCommand::Clear => {
            cache.clear();
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn status(config: &RuntimeConfig) -> Result<ExitCode, NeuroEaseError> {
    let probe = HttpProbe::new(config.probe_url.clone(), config.probe_timeout)?;
    let monitor = ConnectivityMonitor::new();

    let online = monitor.refresh(&probe).await;
    println!("{}", if online { "online" } else { "offline" });
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), NeuroEaseError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
