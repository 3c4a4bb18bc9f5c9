use bridge_traits::time::LogLevel;
use clap::{Parser, Subcommand};
use core_runtime::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "netsuite-sync", version, about = "NetSuite to Repzo customer sync")]
pub struct Cli {
    /// Log output format: pretty, json or compact.
    #[arg(long, global = true, env = "NETSUITE_SYNC_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Minimum level for workspace crates.
    #[arg(long, global = true, env = "NETSUITE_SYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Full filter directive (RUST_LOG syntax), overrides --log-level.
    #[arg(long, global = true, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute one command event.
    Run {
        /// Path to the JSON event, or `-` to read it from stdin.
        #[arg(long)]
        payload: PathBuf,
    },

    /// Print the supported commands as JSON.
    Commands,
}

impl Cli {
    /// Logging configuration from the global flags.
    pub fn logging_config(&self) -> crate::Result<LoggingConfig> {
        let level: LogLevel = self
            .log_level
            .parse()
            .map_err(|e: bridge_traits::error::BridgeError| {
                crate::CoreError::InitializationFailed(e.to_string())
            })?;

        let mut config = LoggingConfig::default().with_level(level);
        if let Some(format) = &self.log_format {
            config = config.with_format(format.parse::<LogFormat>()?);
        }
        if let Some(filter) = self.log_filter.as_deref().filter(|f| !f.trim().is_empty()) {
            config = config.with_filter(filter);
        }
        Ok(config)
    }
}
