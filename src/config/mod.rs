//! Service configuration
//!
//! This module contains:
//! - [`ServiceConfig`]: the `bms.yaml` configuration file
//! - [`paths`]: data directory resolution and the layout beneath it

pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DEFAULT_USER_ID;
use crate::error::{BmsError, Result};

pub use paths::{CONFIG_FILE, DataPaths, data_dir};

/// Default number of installer worker threads
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Service configuration (bms.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Root of registry, code and staging directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Installer worker pool size
    pub worker_threads: usize,

    /// OS users known to the service
    pub users: Vec<i32>,

    /// Default log filter when neither `-v` nor `RUST_LOG` is given
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            worker_threads: DEFAULT_WORKER_THREADS,
            users: vec![DEFAULT_USER_ID],
            log_level: "warn".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BmsError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            BmsError::ConfigParseFailed { reason, .. } => BmsError::ConfigParseFailed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Resolve the configuration for a run
    ///
    /// An explicit `config_path` wins, then `<data_dir>/bms.yaml`, then
    /// defaults. An explicit `data_dir` overrides the file's `data_dir`.
    pub fn load(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let dir = paths::data_dir(data_dir.clone())?;
                let candidate = dir.join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        if data_dir.is_some() || config.data_dir.is_none() {
            config.data_dir = Some(paths::data_dir(data_dir)?);
        }
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Directory layout under the configured data dir
    pub fn paths(&self) -> Result<DataPaths> {
        Ok(DataPaths::new(paths::data_dir(self.data_dir.clone())?))
    }

    fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(BmsError::ConfigParseFailed {
                path: "unknown".to_string(),
                reason: "worker_threads must be at least 1".to_string(),
            });
        }
        if self.users.is_empty() {
            return Err(BmsError::ConfigParseFailed {
                path: "unknown".to_string(),
                reason: "at least one user is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.users, vec![100]);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ServiceConfig::from_yaml("users: [100, 101]\n").unwrap();
        assert_eq!(config.users, vec![100, 101]);
        assert_eq!(config.worker_threads, DEFAULT_WORKER_THREADS);
    }

    #[test]
    fn test_from_yaml_rejects_zero_workers() {
        let err = ServiceConfig::from_yaml("worker_threads: 0\n").unwrap_err();
        assert!(matches!(err, BmsError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ServiceConfig {
            users: vec![100, 102],
            worker_threads: 2,
            ..ServiceConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ServiceConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_prefers_file_in_data_dir() {
        let temp = create_temp_dir();
        fs::write(temp.path().join(CONFIG_FILE), "worker_threads: 2\n").unwrap();

        let config = ServiceConfig::load(None, Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.data_dir.as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = create_temp_dir();
        let file = temp.path().join("custom.yaml");
        fs::write(&file, "users: [7]\n").unwrap();

        let config = ServiceConfig::load(Some(&file), Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.users, vec![7]);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = create_temp_dir();
        let err = ServiceConfig::load(Some(&temp.path().join("nope.yaml")), None).unwrap_err();
        assert!(matches!(err, BmsError::ConfigReadFailed { .. }));
    }
}
