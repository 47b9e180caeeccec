use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::DEFAULT_DEBOUNCE_MS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub table: TableConfig,
    pub search: SearchConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the admin REST API, e.g. "http://localhost:8080/api/admin"
    pub base_url: String,

    /// Request timeout
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows requested per page
    pub page_size: u32,

    /// Show row numbers next to the checkbox column
    pub show_row_numbers: bool,

    /// Message shown when a page has no rows
    pub empty_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before typed search text is sent to the backend
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between monitoring snapshot refreshes
    pub refresh_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/admin".to_string(),
            timeout_secs: 15,
            token: None,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            show_row_numbers: false,
            empty_message: "No records found".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { refresh_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Reject values the table and filter bar cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.table.page_size == 0 {
            anyhow::bail!("table.page_size must be greater than zero");
        }
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("insure-admin").join("config.toml"))
    }

    /// Default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# insure-admin configuration
# Location: ~/.config/insure-admin/config.toml (Linux)
#           ~/Library/Application Support/insure-admin/config.toml (macOS)
#           %APPDATA%\insure-admin\config.toml (Windows)

[api]
# Admin REST API base URL
base_url = "http://localhost:8080/api/admin"

# Request timeout in seconds
timeout_secs = 15

# Bearer token (leave commented to send no Authorization header)
# token = "..."

[table]
# Rows per page requested from the backend
page_size = 10

# Show row numbers in list screens
show_row_numbers = false

# Shown when a page comes back empty
empty_message = "No records found"

[search]
# Milliseconds of typing inactivity before a search is sent
debounce_ms = {}

[monitor]
# Seconds between health/metrics refreshes
refresh_secs = 30

[logging]
# Default log filter (RUST_LOG takes precedence)
level = "info"
"#,
            DEFAULT_DEBOUNCE_MS
        )
    }
}
