//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::WrapErr;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ROUTEADM_CONFIG";

const FILE_NAME: &str = "routeadm.toml";

/// Settings read from `routeadm.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default page size for list commands
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Where the session credential is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            log_level: default_log_level(),
            page_size: default_page_size(),
            session_file: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_page_size() -> u64 {
    10
}

impl CliConfig {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let config: CliConfig =
            toml::from_str(&content).wrap_err_with(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    ///
    /// Returns the path the configuration came from, if any.
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        for path in search_paths() {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Write configuration to file, creating parent directories
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .wrap_err_with(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Session file, defaulting to the user config directory
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("routeadm/session.json")
        })
    }
}

/// Where `load_default` looks, in order
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("routeadm").join(FILE_NAME));
    }
    paths
}

/// Path new configuration is written to when no file exists yet
#[must_use]
pub fn default_save_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("routeadm").join(FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(FILE_NAME))
}
