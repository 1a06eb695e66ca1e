use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::config_file::DEFAULT_CONFIG_PATH;
use crate::logging::LogDestination;

/// Route one spoken-style music command through the local catalog and the
/// network resolvers.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "music_app", version, about)]
pub struct Args {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long = "config", value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    #[arg(long, value_name = "LEVEL", default_value = "info", value_parser = level_filter)]
    pub log_level: LevelFilter,

    #[arg(long = "log", value_enum, ignore_case = true, default_value_t = LogDestination::Terminal)]
    pub log_destination: LogDestination,

    /// Cancel the command after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Play a random song from the local catalog.
    #[arg(long, conflicts_with = "text")]
    pub random: bool,

    /// The command, e.g. `我想听晴天`.
    #[arg(required_unless_present = "random")]
    pub text: Vec<String>,
}

impl Args {
    pub fn command_text(&self) -> String {
        self.text.join(" ")
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

fn level_filter(name: &str) -> Result<LevelFilter, Infallible> {
    Ok(music_logging::parse_level(name))
}
