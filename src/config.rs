use crate::solve::PuzzleType;
use crate::stats::{BinEdge, DEFAULT_HISTOGRAM_BINS};
use crate::timer::{
    FinishPolicy, TimerConfig, DEFAULT_BUSY_MS, DEFAULT_DEBOUNCE_MS, DEFAULT_SAMPLE_INTERVAL_MS,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_NOTICE_SECS: u64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub puzzle_type: PuzzleType,
    pub finish_policy: FinishPolicy,
    pub debounce_ms: u64,
    pub busy_ms: u64,
    pub sample_interval_ms: u64,
    pub histogram_bins: usize,
    pub bin_edge: BinEdge,
    pub notice_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            puzzle_type: PuzzleType::default(),
            finish_policy: FinishPolicy::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            busy_ms: DEFAULT_BUSY_MS,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            bin_edge: BinEdge::default(),
            notice_secs: DEFAULT_NOTICE_SECS,
        }
    }
}

impl Config {
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            busy: Duration::from_millis(self.busy_ms),
            sample_interval: Duration::from_millis(self.sample_interval_ms),
            finish_policy: self.finish_policy,
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "cubit") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("cubit_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
