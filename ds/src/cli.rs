//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// dancesort - arrange dances into a constraint specification and schedule them
#[derive(Parser)]
#[command(
    name = "ds",
    about = "Arrange dances into ordering constraints and request schedules",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the dances found in a sheet export
    Items {
        /// Sheet values file (YAML or JSON)
        sheet: PathBuf,
    },

    /// Show the specification that would be sent to the scheduler
    Plan {
        /// Sheet values file (YAML or JSON)
        sheet: PathBuf,

        /// Saved preferences to place dances with
        #[arg(short, long)]
        preferences: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Submit preferences to the scheduler and show the schedules
    Submit {
        /// Sheet values file (YAML or JSON)
        sheet: PathBuf,

        /// Spreadsheet the sheet was exported from
        #[arg(long)]
        spreadsheet_id: String,

        /// Sheet (tab) name inside the spreadsheet
        #[arg(long)]
        sheet_name: String,

        /// Saved preferences to place dances with
        #[arg(short, long)]
        preferences: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check a saved scheduler response against saved preferences
    Check {
        /// Saved preferences
        preferences: PathBuf,

        /// Saved scheduler response (JSON)
        response: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dancesort")
        .join("logs")
        .join("dancesort.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Output format for plan/submit/check commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
