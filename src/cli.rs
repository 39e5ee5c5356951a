//! Command-line interface parsing for NeuroEase
//!
//! This module handles parsing of CLI arguments using clap and derives the
//! `RuntimeConfig` the binary runs with: where rating state and the cache
//! live, which URL to probe for reachability, and how loud to log.

use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::NeuroEaseError;

/// Default URL probed for network reachability
pub const DEFAULT_PROBE_URL: &str = "https://www.google.com/generate_204";

/// Default TTL for `cache put`, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// NeuroEase - strategy ratings and offline cache
#[derive(Parser, Debug)]
#[command(name = "neuroease")]
#[command(about = "Aggregate strategy ratings and manage the offline cache")]
#[command(version)]
pub struct Cli {
    /// Directory holding ratings.json
    #[arg(long, env = "NEUROEASE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// File the cache table is persisted to
    #[arg(long, env = "NEUROEASE_CACHE_FILE", global = true)]
    pub cache_file: Option<PathBuf>,

    /// URL probed to decide whether the network is reachable
    #[arg(long, env = "NEUROEASE_PROBE_URL", default_value = DEFAULT_PROBE_URL, global = true)]
    pub probe_url: String,

    /// Give up on the reachability probe after this many milliseconds
    #[arg(long, default_value_t = 3000, global = true)]
    pub probe_timeout_ms: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a rating
    #[command(subcommand)]
    Rate(RateCommand),

    /// Show aggregates and the rating log for a strategy
    Show {
        /// Strategy identifier
        subject: String,
    },

    /// Read or write the offline cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Probe network reachability
    Status,
}

#[derive(Subcommand, Debug)]
pub enum RateCommand {
    /// Rate a community strategy from 1 to 5
    Community(CommunityArgs),

    /// Record how well a personal coping strategy worked, from 0 to 1
    Effectiveness {
        /// Strategy identifier
        subject: String,
        /// Effectiveness score between 0 and 1
        #[arg(allow_negative_numbers = true)]
        value: String,
    },
}

#[derive(Args, Debug)]
pub struct CommunityArgs {
    /// Strategy identifier
    pub subject: String,

    /// Rating from 1 to 5
    #[arg(allow_negative_numbers = true)]
    pub value: String,

    /// Who is submitting the rating
    #[arg(long)]
    pub rater: String,

    /// Optional free-text feedback
    #[arg(long)]
    pub feedback: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Store a JSON payload
    Put {
        key: String,
        /// Payload as JSON text
        payload: String,
        /// Seconds until the entry goes stale
        #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
        ttl_secs: u64,
    },

    /// Print a payload if present and fresh
    Get { key: String },

    /// Remove every entry
    Clear,
}

/// Configuration derived from CLI arguments for running a command
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Directory holding the rating store
    pub data_dir: PathBuf,
    /// File holding the cache table
    pub cache_file: PathBuf,
    /// URL probed for reachability
    pub probe_url: String,
    /// Probe timeout
    pub probe_timeout: Duration,
    /// Number of -v flags given
    pub verbosity: u8,
}

impl RuntimeConfig {
    /// Creates a RuntimeConfig from parsed CLI arguments.
    ///
    /// Paths not given on the command line or in the environment fall back to
    /// the XDG data and cache directories for `neuroease`.
    ///
    /// # Returns
    /// * `Ok(RuntimeConfig)` with every path resolved
    /// * `Err(NeuroEaseError::NoDirectory)` if a default is needed but there is no home directory
    pub fn from_cli(cli: &Cli) -> Result<Self, NeuroEaseError> {
        let project_dirs = ProjectDirs::from("", "", "neuroease");

        let data_dir = match (&cli.data_dir, &project_dirs) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dirs)) => dirs.data_dir().to_path_buf(),
            (None, None) => return Err(NeuroEaseError::NoDirectory("data")),
        };
        let cache_file = match (&cli.cache_file, &project_dirs) {
            (Some(file), _) => file.clone(),
            (None, Some(dirs)) => dirs.cache_dir().join("cache.json"),
            (None, None) => return Err(NeuroEaseError::NoDirectory("cache")),
        };

        Ok(Self {
            data_dir,
            cache_file,
            probe_url: cli.probe_url.clone(),
            probe_timeout: Duration::from_millis(cli.probe_timeout_ms),
            verbosity: cli.verbose,
        })
    }
}
