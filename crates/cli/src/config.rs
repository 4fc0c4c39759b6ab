// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration.
//!
//! Read from `config.toml` in the state directory unless `--config` or
//! `TETHER_CONFIG` points elsewhere. Every field has a default, so a missing
//! file yields a fully usable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tether_core::RetryPolicy;
use tether_store::BackupPolicy;

use crate::env;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const HEALTH_PATH: &str = "/health";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub retry: RetryConfig,
    pub backup: BackupConfig,
    pub sensor: SensorConfig,
}

/// Liveness probe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Service base URL; the probe targets `<base_url>/health`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-probe timeout in milliseconds (default: 5000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Health check interval in milliseconds (default: 30000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Consecutive failures before reporting disconnected (default: 3).
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

/// Pending action retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Session backup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Schema version stamped on saved backups.
    #[serde(default = "default_backup_version")]
    pub version: u32,
    /// Backups older than this are discarded (default: 24h).
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

/// Link sensor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_failure_threshold() -> u32 {
    tether_core::DEFAULT_FAILURE_THRESHOLD
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backup_version() -> u32 {
    1
}

fn default_max_age_secs() -> u64 {
    24 * 60 * 60
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/net")
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            interval_ms: default_interval_ms(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig { version: default_backup_version(), max_age_secs: default_max_age_secs() }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            sysfs_root: default_sysfs_root(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ProbeConfig {
    /// Full URL of the liveness endpoint.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), HEALTH_PATH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy::new(self.base_delay_ms, self.max_delay_ms, self.max_attempts)?)
    }
}

impl BackupConfig {
    pub fn policy(&self) -> BackupPolicy {
        BackupPolicy { version: self.version, max_age: Duration::from_secs(self.max_age_secs) }
    }
}

impl SensorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Loads the config at `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Self::parse(&content)
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the runtime cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout_ms == 0 {
            return Err(invalid("probe.timeout_ms", "must be greater than 0"));
        }
        if self.probe.interval_ms == 0 {
            return Err(invalid("probe.interval_ms", "must be greater than 0"));
        }
        if self.probe.failure_threshold == 0 {
            return Err(invalid("probe.failure_threshold", "must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(invalid("retry.base_delay_ms", "must be greater than 0"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.base_delay_ms",
                format!(
                    "{} exceeds retry.max_delay_ms {}",
                    self.retry.base_delay_ms, self.retry.max_delay_ms
                ),
            ));
        }
        if self.sensor.poll_interval_ms == 0 {
            return Err(invalid("sensor.poll_interval_ms", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidConfig { field, reason: reason.into() }
}

/// Directory holding persisted state and the default config file.
///
/// `TETHER_STATE_DIR`, else `$XDG_STATE_HOME/tether`, else
/// `~/.local/state/tether`.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join("tether");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/tether"))
        .unwrap_or_else(|| PathBuf::from(".local/state/tether"))
}

/// Resolves the config file location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    env::config_path().unwrap_or_else(|| state_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
