//! dancesort configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::registry::DEFAULT_SKIP_LABELS;
use crate::scheduler::Credential;

/// Main dancesort configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// External scheduler configuration
    pub scheduler: SchedulerConfig,

    /// Spreadsheet layout
    pub sheet: SheetConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the credential environment variable is set. Call this
    /// before submitting so a missing token fails fast with a clear message.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.scheduler.credential_env).is_err() {
            return Err(eyre::eyre!(
                "Scheduler credential not found. Set the {} environment variable.",
                self.scheduler.credential_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .dancesort.yml
        let local_config = PathBuf::from(".dancesort.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/dancesort/dancesort.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dancesort").join("dancesort.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// External scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Endpoint accepting scheduling requests
    pub url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Environment variable holding the bearer credential
    #[serde(rename = "credential-env")]
    pub credential_env: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            url: "https://us-central1-dancesorterbackend.cloudfunctions.net/process_request".to_string(),
            timeout_ms: 120_000,
            credential_env: "DANCESORT_TOKEN".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Read the credential from the configured environment variable
    pub fn get_credential(&self) -> Result<Credential> {
        let token = std::env::var(&self.credential_env)
            .context(format!("Environment variable {} not set", self.credential_env))?;
        Ok(Credential::new(token.trim()))
    }
}

/// Spreadsheet layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Header of the column holding item names
    #[serde(rename = "item-column")]
    pub item_column: String,

    /// Cell values in the item column that are section headers, not items
    #[serde(rename = "skip-labels")]
    pub skip_labels: Vec<String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            item_column: "Dance".to_string(),
            skip_labels: DEFAULT_SKIP_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
