use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use rescue_core::{DetectorSettings, DEFAULT_SNAPSHOT_MARKER, DEFAULT_STATUS_PAGE_BASE};
use rescue_engine::{EngineSettings, LookupSettings, WorkflowTimings, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "./wayback_rescue.ron";

/// On-disk configuration. Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub searching_delay_ms: u64,
    pub found_delay_ms: u64,
    pub snapshot_marker: String,
    pub status_page_base: String,
    pub log_level: String,
    pub log_to_file: bool,
}

impl Default for RescueConfig {
    fn default() -> Self {
        let lookup = LookupSettings::default();
        let timings = WorkflowTimings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: millis(lookup.connect_timeout),
            request_timeout_ms: millis(lookup.request_timeout),
            searching_delay_ms: millis(timings.searching_delay),
            found_delay_ms: millis(timings.found_delay),
            snapshot_marker: DEFAULT_SNAPSHOT_MARKER.to_string(),
            status_page_base: DEFAULT_STATUS_PAGE_BASE.to_string(),
            log_level: "warn".to_string(),
            log_to_file: false,
        }
    }
}

impl RescueConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            lookup: LookupSettings {
                endpoint: self.endpoint.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
            },
            timings: self.timings(),
            detector: DetectorSettings {
                snapshot_marker: self.snapshot_marker.clone(),
            },
        }
    }

    pub fn timings(&self) -> WorkflowTimings {
        WorkflowTimings {
            searching_delay: Duration::from_millis(self.searching_delay_ms),
            found_delay: Duration::from_millis(self.found_delay_ms),
        }
    }

    /// Falls back to `warn` for unknown level names.
    pub fn level(&self) -> LevelFilter {
        rescue_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Warn)
    }

    /// Upper bound for one rescue to finish: every lookup runs concurrently,
    /// so a single request timeout plus the pacing delays.
    pub fn rescue_deadline(&self) -> Duration {
        Duration::from_millis(
            self.connect_timeout_ms
                + self.request_timeout_ms
                + self.searching_delay_ms
                + self.found_delay_ms,
        ) + Duration::from_secs(5)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("failed to write config {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Loads the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RescueConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(RescueConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn write_config(path: &Path, config: &RescueConfig) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)
        .map_err(|err| ConfigError::Serialize(err.to_string()))?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
