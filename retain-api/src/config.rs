//! Service configuration
//!
//! CLI flags and environment variables (via clap) take priority over
//! the TOML config file; compiled defaults fill whatever remains.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use retain_common::config::{default_database_path, TomlConfig};
use retain_common::Error;

use crate::error::DEFAULT_ROW_ERROR_CAP;
use crate::services::ConflictPolicy;

const DEFAULT_PORT: u16 = 5180;
const DEFAULT_SCORING_URL: &str = "http://localhost:8000";
const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "retain-api", version, about = "HR attrition record ingest service")]
pub struct Args {
    /// HTTP listen port
    #[arg(long, env = "RETAIN_PORT")]
    pub port: Option<u16>,

    /// Path to the SQLite database file
    #[arg(long, env = "RETAIN_DATABASE")]
    pub database: Option<PathBuf>,

    /// Base URL of the attrition scoring service
    #[arg(long, env = "RETAIN_SCORING_URL")]
    pub scoring_url: Option<String>,

    /// Timeout for scoring service calls, in seconds
    #[arg(long, env = "RETAIN_SCORING_TIMEOUT_SECS")]
    pub scoring_timeout_secs: Option<u64>,

    /// What to do when an employee batch collides with existing rows
    /// ("reject" or "advisory")
    #[arg(long, env = "RETAIN_CONFLICT_POLICY")]
    pub conflict_policy: Option<ConflictPolicy>,

    /// Maximum row-validation errors quoted in a result message
    #[arg(long, env = "RETAIN_MAX_ROW_ERRORS")]
    pub max_row_errors: Option<usize>,

    /// Explicit config file path (default: retain.toml in the platform
    /// config directory)
    #[arg(long, env = "RETAIN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub scoring_base_url: String,
    pub scoring_timeout: Duration,
    pub conflict_policy: ConflictPolicy,
    pub max_row_errors: usize,
}

impl ApiConfig {
    /// Merge CLI/env arguments with the TOML config file and defaults.
    pub fn resolve(args: Args) -> retain_common::Result<Self> {
        let file = TomlConfig::load(args.config.as_deref())?;

        let file_policy = file
            .conflict_policy
            .as_deref()
            .map(str::parse::<ConflictPolicy>)
            .transpose()
            .map_err(Error::Config)?;

        Ok(Self {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path: args
                .database
                .or(file.database_path)
                .unwrap_or_else(default_database_path),
            scoring_base_url: args
                .scoring_url
                .or(file.scoring_base_url)
                .unwrap_or_else(|| DEFAULT_SCORING_URL.to_string()),
            scoring_timeout: Duration::from_secs(
                args.scoring_timeout_secs
                    .or(file.scoring_timeout_secs)
                    .unwrap_or(DEFAULT_SCORING_TIMEOUT_SECS),
            ),
            conflict_policy: args
                .conflict_policy
                .or(file_policy)
                .unwrap_or_default(),
            max_row_errors: args
                .max_row_errors
                .or(file.max_row_errors)
                .unwrap_or(DEFAULT_ROW_ERROR_CAP),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_args() -> Args {
        Args {
            port: None,
            database: None,
            scoring_url: None,
            scoring_timeout_secs: None,
            conflict_policy: None,
            max_row_errors: None,
            config: None,
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ApiConfig::resolve(no_args()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.scoring_base_url, DEFAULT_SCORING_URL);
        assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
        assert_eq!(config.max_row_errors, DEFAULT_ROW_ERROR_CAP);
    }

    #[test]
    fn cli_wins_over_defaults() {
        let mut args = no_args();
        args.port = Some(9999);
        args.conflict_policy = Some(ConflictPolicy::Advisory);

        let config = ApiConfig::resolve(args).unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.conflict_policy, ConflictPolicy::Advisory);
    }
}
