//! Configuration for cache behavior, HTTP limits, and service endpoints
//!
//! Defaults live in code and match what users get with no configuration at
//! all. An optional `config.json` in the platform config directory overrides
//! individual fields, and `CHAINDATA_CACHE_DIR` overrides the cache root on
//! top of that. The CLI's `--cache-dir` flag wins over everything.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::output;

/// Environment variable overriding the cache root directory
const CACHE_DIR_ENV: &str = "CHAINDATA_CACHE_DIR";

/// Top-level aggregator configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub services: ServicesConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Loads configuration: in-code defaults, then the optional config
    /// file, then environment overrides
    pub fn load() -> Self {
        let mut config = Self::from_config_file().unwrap_or_default();
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.is_empty() {
                config.cache.directory = Some(PathBuf::from(dir));
            }
        }
        config
    }

    /// Reads `config.json` from the platform config directory, if present
    ///
    /// A malformed file is reported and ignored rather than aborting, so a
    /// bad edit never locks the user out of the tool.
    fn from_config_file() -> Option<Self> {
        let path = ProjectDirs::from("", "", "chaindata")?
            .config_dir()
            .join("config.json");
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                output::print_warning(&format!(
                    "ignoring malformed config file {}: {err}",
                    path.display()
                ));
                None
            }
        }
    }
}

/// Cache locations and expiry windows
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root override; the platform cache directory when unset
    pub directory: Option<PathBuf>,
    /// Expiry for keyed API responses, in seconds
    pub expiry_seconds: u64,
    /// Expiry for the full chain registry snapshot, in seconds
    pub blockchain_expiry_seconds: u64,
    /// Namespace subdirectory for the chain registry
    pub blockchain_subdir: String,
    /// Namespace subdirectory for DeFi analytics responses
    pub defillama_subdir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            expiry_seconds: 3600,
            blockchain_expiry_seconds: 86_400,
            blockchain_subdir: "blockchain".to_string(),
            defillama_subdir: "defillama".to_string(),
        }
    }
}

impl CacheConfig {
    /// Resolves the cache root directory
    ///
    /// Falls back to a `cache` directory next to the binary's working
    /// directory when the platform provides no home (some CI containers).
    pub fn root(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        ProjectDirs::from("", "", "chaindata")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("cache"))
    }

    /// Expiry window for keyed API responses
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_seconds)
    }

    /// Expiry window for the chain registry snapshot
    pub fn blockchain_expiry(&self) -> Duration {
        Duration::from_secs(self.blockchain_expiry_seconds)
    }
}

/// Timeout and retry policy for upstream requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt timeout, in seconds
    pub timeout_secs: u64,
    /// Total attempts per request, including the first
    pub retry_attempts: u32,
    /// Base backoff before the first retry, in seconds
    pub retry_backoff_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retry_attempts: 3,
            retry_backoff_secs: 1,
        }
    }
}

/// Upstream service endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub chainlist_url: String,
    pub defillama_url: String,
    pub defillama_coins_url: String,
    pub defillama_stablecoins_url: String,
    pub defillama_yields_url: String,
    pub etherscan_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            chainlist_url: "https://chainlist.org/rpcs.json".to_string(),
            defillama_url: "https://api.llama.fi".to_string(),
            defillama_coins_url: "https://coins.llama.fi".to_string(),
            defillama_stablecoins_url: "https://stablecoins.llama.fi".to_string(),
            defillama_yields_url: "https://yields.llama.fi".to_string(),
            etherscan_url: "https://api.etherscan.io/api".to_string(),
        }
    }
}

/// Rendering preferences for tables and timestamps
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime pattern for rendered timestamps
    pub date_format: String,
    /// Default row cap for long listings
    pub default_limit: usize,
    /// TVL history entries shown in protocol details
    pub max_history_entries: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            default_limit: 10,
            max_history_entries: 5,
        }
    }
}
