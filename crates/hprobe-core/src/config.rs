use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::DEFAULT_FIRST_CHUNK_BYTES;
use crate::runner::RunSettings;
use crate::suite::DEFAULT_TARGET_URL;

/// Global configuration loaded from `~/.config/hprobe/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Endpoint every built-in suite probes.
    pub target_url: String,
    /// Body bytes read by a streaming GET before the transfer is cut.
    #[serde(default = "default_first_chunk_bytes")]
    pub first_chunk_bytes: usize,
    /// Optional per-request timeout in seconds applied to every suite
    /// (None = each suite's own literal).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_first_chunk_bytes() -> usize {
    DEFAULT_FIRST_CHUNK_BYTES
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            first_chunk_bytes: DEFAULT_FIRST_CHUNK_BYTES,
            timeout_secs: None,
        }
    }
}

impl ProbeConfig {
    /// Runner settings from config, with `timeout_override` (CLI) taking precedence.
    pub fn run_settings(&self, timeout_override: Option<u64>) -> RunSettings {
        RunSettings {
            timeout: timeout_override
                .or(self.timeout_secs)
                .filter(|&s| s > 0)
                .map(Duration::from_secs),
            first_chunk_bytes: self.first_chunk_bytes.max(1),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ProbeConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ProbeConfig> {
    if !path.exists() {
        let default_cfg = ProbeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: ProbeConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
