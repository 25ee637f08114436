//! Command-line interface handling for the event monitor.
//!
//! This module provides command-line argument parsing using the `clap` crate.

use clap::{Arg, Command};
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments parsed from user input.
///
/// These override the matching configuration file settings.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Stop on its own after this long instead of waiting for a signal
    pub duration: Option<Duration>,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    pub fn parse() -> Self {
        Self::from_matches(Self::command().get_matches())
    }

    fn command() -> Command {
        Command::new("Event Monitor")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Drives an event manager with synthetic input, window and lifecycle events")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("event_monitor.toml"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("duration-secs")
                    .short('d')
                    .long("duration-secs")
                    .value_name("SECONDS")
                    .help("Close the simulated window after this many seconds")
                    .value_parser(clap::value_parser!(u64)),
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("event_monitor.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            duration: matches
                .get_one::<u64>("duration-secs")
                .map(|secs| Duration::from_secs(*secs)),
        }
    }
}
