//! Configuration file loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority, parsed by the service binary)
//! 2. Environment variable (also parsed by the service binary via clap)
//! 3. TOML config file (loaded here)
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Optional settings read from a `retain.toml` config file.
///
/// Every field is optional; the service binary merges these with
/// CLI/environment values and compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen port
    pub port: Option<u16>,

    /// Path to the SQLite database file
    pub database_path: Option<PathBuf>,

    /// Base URL of the attrition scoring service
    pub scoring_base_url: Option<String>,

    /// Timeout for scoring service calls, in seconds
    pub scoring_timeout_secs: Option<u64>,

    /// Conflict policy for employee imports: "reject" or "advisory"
    pub conflict_policy: Option<String>,

    /// Maximum row-validation errors quoted in a result message
    pub max_row_errors: Option<usize>,
}

impl TomlConfig {
    /// Load config from an explicit path, or from the default locations.
    ///
    /// Returns `TomlConfig::default()` when no config file exists; a file
    /// that exists but fails to parse is an error, not a silent fallback.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path(),
        };

        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)?;
                let config: TomlConfig = toml::from_str(&contents)
                    .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
                info!("Loaded config file: {}", path.display());
                Ok(config)
            }
            None => Ok(TomlConfig::default()),
        }
    }
}

/// Default config file path for the platform.
///
/// Linux checks `~/.config/retain/retain.toml` then `/etc/retain/retain.toml`;
/// other platforms use the OS config directory. Returns None when no file
/// exists at any candidate location.
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("retain").join("retain.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/retain/retain.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("retain").join("retain.db"))
        .unwrap_or_else(|| PathBuf::from("./retain.db"))
}
