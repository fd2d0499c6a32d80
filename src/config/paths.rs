//! Data directory resolution and layout

use std::path::{Path, PathBuf};

use crate::error::{BmsError, Result};

/// Default data directory name under the user's data directory
const DATA_DIR: &str = "bms";

/// Configuration file name inside the data directory
pub const CONFIG_FILE: &str = "bms.yaml";

/// Registry database file name
pub const REGISTRY_FILE: &str = "registry.json";

/// Installed module code directories
pub const APP_DIR: &str = "app";

/// Deployed quick fixes
pub const QUICK_FIX_DIR: &str = "quickfix";

/// Transaction staging area
pub const STAGING_DIR: &str = "staging";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "BMS_DATA_DIR";

/// Get the data directory path
///
/// An explicit path wins. Otherwise uses the platform's standard data location
/// with a `bms` subdirectory; can be overridden with the `BMS_DATA_DIR`
/// environment variable.
pub fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::data_dir().ok_or_else(|| BmsError::Internal {
        message: "Could not determine data directory".to_string(),
    })?;
    Ok(base.join(DATA_DIR))
}

/// Layout of a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn app_dir(&self) -> PathBuf {
        self.root.join(APP_DIR)
    }

    pub fn quick_fix_dir(&self) -> PathBuf {
        self.root.join(QUICK_FIX_DIR)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Code directory of one module
    pub fn module_dir(&self, bundle_name: &str, module_name: &str) -> PathBuf {
        self.app_dir().join(bundle_name).join(module_name)
    }
}
