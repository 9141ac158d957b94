use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::correlate::DEFAULT_LOOKUP_TIMEOUT;
use crate::scanner::DEFAULT_MAX_DEPTH;

/// Global configuration loaded from `~/.config/xmedia/config.toml`.
///
/// Components take these values as plain parameters (injected depth bound,
/// injected timeout), so tests never touch the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Upper bound in seconds on how long one lookup may stay pending.
    pub lookup_timeout_secs: u64,
    /// Recursion bound for the payload scanner.
    pub max_scan_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT.as_secs(),
            max_scan_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CaptureConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("xmedia")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CaptureConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CaptureConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CaptureConfig = toml::from_str(&data)?;
    Ok(cfg)
}
