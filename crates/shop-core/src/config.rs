use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per remote operation (including the first).
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff (doubles per attempt).
    pub base_delay_ms: u64,
    /// Timeout for a single attempt in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 2000,
            attempt_timeout_ms: 20_000,
        }
    }
}

/// Reachability pre-check (`[reachability]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityConfig {
    /// When false, remote calls are attempted without a pre-check.
    pub enabled: bool,
    /// URL probed with a HEAD request.
    pub probe_url: String,
    /// Connect timeout for the probe in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_url: "https://clients3.google.com/generate_204".to_string(),
            connect_timeout_ms: 3000,
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_payment_timeout_secs() -> u64 {
    180
}

/// Global configuration loaded from `~/.config/shop/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Page size used by list screens when none is requested.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Seconds a payment may stay in `Loading` before it is failed.
    #[serde(default = "default_payment_timeout_secs")]
    pub payment_timeout_secs: u64,
    /// Preferred UI locale (e.g. "en", "vi"). Carried as data only.
    #[serde(default)]
    pub locale: Option<String>,
    /// Document store location; defaults to the XDG state dir.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub reachability: ReachabilityConfig,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            payment_timeout_secs: default_payment_timeout_secs(),
            locale: None,
            store_path: None,
            retry: RetryConfig::default(),
            reachability: ReachabilityConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("shop")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ShopConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ShopConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<ShopConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ShopConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
