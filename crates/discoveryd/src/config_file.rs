//! Configuration file support for discoveryd
//!
//! Loads and validates daemon configuration from TOML files.
//! Default location: /etc/topo-discovery/discoveryd.toml

use crate::error::{DaemonError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use topo_discovery::DiscoveryOptions;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/topo-discovery/discoveryd.toml";

/// Discovery tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Delay between two discovery probes on an active port
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Worker pool and timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of partitions (one orchestrator each)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Period of the monotonic tick in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Capacity of every worker input queue
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

/// Durable topology snapshot location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

/// Complete discoveryd configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverydConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

// Default functions
fn default_interval_ms() -> u64 {
    topo_discovery::DEFAULT_DISCOVERY_INTERVAL_MS
}

fn default_workers() -> usize {
    4
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_queue_depth() -> usize {
    1024
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("/var/lib/topo-discovery/topology.json")
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            tick_interval_ms: default_tick_interval_ms(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl DiscoverydConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                DaemonError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(DaemonError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            DaemonError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.runtime.tick_interval_ms)
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            discovery_interval_ms: self.discovery.interval_ms,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discovery.interval_ms == 0 {
            return Err(DaemonError::Configuration(
                "discovery.interval_ms must be > 0".to_string(),
            ));
        }

        if self.runtime.workers == 0 {
            return Err(DaemonError::Configuration(
                "runtime.workers must be > 0".to_string(),
            ));
        }

        if self.runtime.tick_interval_ms == 0 {
            return Err(DaemonError::Configuration(
                "runtime.tick_interval_ms must be > 0".to_string(),
            ));
        }

        if self.runtime.queue_depth == 0 {
            return Err(DaemonError::Configuration(
                "runtime.queue_depth must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = DiscoverydConfig::default();
        assert_eq!(config.discovery.interval_ms, 3000);
        assert_eq!(config.runtime.workers, 4);
        assert_eq!(config.runtime.tick_interval_ms, 1000);
        assert_eq!(config.runtime.queue_depth, 1024);
        assert_eq!(
            config.store.snapshot_path,
            PathBuf::from("/var/lib/topo-discovery/topology.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = DiscoverydConfig::default();
        config.runtime.workers = 0;
        assert!(config.validate().is_err());

        let mut config = DiscoverydConfig::default();
        config.runtime.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = DiscoverydConfig::default();
        config.runtime.queue_depth = 0;
        assert!(config.validate().is_err());

        let mut config = DiscoverydConfig::default();
        config.discovery.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[discovery]
interval_ms = 500

[runtime]
workers = 8
"#;
        let config: DiscoverydConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.discovery.interval_ms, 500);
        assert_eq!(config.runtime.workers, 8);
        // Unspecified values should use defaults
        assert_eq!(config.runtime.queue_depth, 1024);
        assert_eq!(config.discovery_options().discovery_interval_ms, 500);
    }

    #[test]
    fn test_tick_interval_duration() {
        let config = DiscoverydConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = DiscoverydConfig::load_or_default("/nonexistent/discoveryd.toml").unwrap();
        assert_eq!(config, DiscoverydConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("discoveryd.toml");

        let mut config = DiscoverydConfig::default();
        config.runtime.workers = 2;
        config.store.snapshot_path = dir.path().join("topology.json");
        config.save(&path).unwrap();

        let loaded = DiscoverydConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("discoveryd.toml");
        fs::write(&path, "[runtime\nworkers = ").unwrap();

        let err = DiscoverydConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, DaemonError::Configuration(_)));
    }
}
