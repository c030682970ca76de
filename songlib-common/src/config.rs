//! Configuration loading and config file resolution
//!
//! Resolution order for every setting:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable (applied by the binary through clap)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SONGLIB_CONFIG";

/// Deployment environment, selects log format and verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogEnv {
    /// Human-readable output, debug level
    #[default]
    Local,
    /// JSON output, debug level
    Dev,
    /// JSON output, info level
    Prod,
}

impl FromStr for LogEnv {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(LogEnv::Local),
            "dev" => Ok(LogEnv::Dev),
            "prod" => Ok(LogEnv::Prod),
            other => Err(Error::Config(format!(
                "Unknown env '{}' (expected local, dev or prod)",
                other
            ))),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
        }
    }
}

/// SQLite database location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Default page sizes for song listings and lyric windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Songs per page when the caller does not pass a count
    pub page_size: u32,
    /// Verses per lyric page when the caller does not pass a count
    pub verses_per_page: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            verses_per_page: 2,
        }
    }
}

/// External song metadata lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the lookup API; lookup is disabled when unset
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

/// Top-level catalog service configuration (TOML schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    pub env: LogEnv,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: PagingConfig,
    pub lookup: LookupConfig,
}

impl CatalogConfig {
    /// Parse configuration from TOML text; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults when no file is found
    ///
    /// An explicitly named file that cannot be read is an error; a missing
    /// default file only logs a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges after all overrides are applied
    pub fn validate(&self) -> Result<()> {
        if self.catalog.page_size == 0 {
            return Err(Error::Config("catalog.page_size must be >= 1".to_string()));
        }
        if self.catalog.verses_per_page == 0 {
            return Err(Error::Config(
                "catalog.verses_per_page must be >= 1".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if let Some(url) = &self.lookup.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "lookup.base_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        Ok(())
    }
}

/// Resolve which config file to read
///
/// Priority: command-line argument, then `SONGLIB_CONFIG`, then none
/// (the caller falls back to the platform default location).
pub fn resolve_config_path(cli_arg: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Platform config file location (`~/.config/songlib/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songlib").join("config.toml"))
}

/// OS-dependent default database path
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songlib"))
        .unwrap_or_else(|| PathBuf::from("./songlib_data"))
        .join("songlib.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_env_parse() {
        assert_eq!("local".parse::<LogEnv>().unwrap(), LogEnv::Local);
        assert_eq!(" PROD ".parse::<LogEnv>().unwrap(), LogEnv::Prod);
        assert!("staging".parse::<LogEnv>().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = CatalogConfig::default();
        assert_eq!(config.catalog.page_size, 5);
        assert_eq!(config.server.port, 5740);
        assert!(config.lookup.base_url.is_none());
        assert!(config.validate().is_ok());
    }
}
