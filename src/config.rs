//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/indicators.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [remote]
//! base_url = "http://api.worldbank.org/v2"
//! date_range = "2012:2017"
//! per_page = 1000
//! timeout_secs = 30
//! ```
//!
//! Only `[db].path` and `[server].bind` are required; every other key has
//! a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Settings for the remote statistics API.
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Year range passed as the `date` query parameter.
    #[serde(default = "default_date_range")]
    pub date_range: String,
    /// Page-size hint for the first request.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on pages walked when a resized request still spans pages.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            date_range: default_date_range(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_base_url() -> String {
    "http://api.worldbank.org/v2".to_string()
}
fn default_date_range() -> String {
    "2012:2017".to_string()
}
fn default_per_page() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_pages() -> u32 {
    50
}

impl Config {
    /// Defaults with the database at `./data/indicators.sqlite`, for tests
    /// and commands that run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/indicators.sqlite"),
                max_connections: default_max_connections(),
            },
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
            remote: RemoteConfig::default(),
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.db.max_connections == 0 {
            anyhow::bail!("db.max_connections must be > 0");
        }
        if self.remote.per_page == 0 {
            anyhow::bail!("remote.per_page must be > 0");
        }
        if self.remote.timeout_secs == 0 {
            anyhow::bail!("remote.timeout_secs must be > 0");
        }
        if self.remote.max_pages == 0 {
            anyhow::bail!("remote.max_pages must be > 0");
        }
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "remote.base_url must start with http:// or https://, got '{}'",
                self.remote.base_url
            );
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
