//! Registry persisted to a JSON database file
//!
//! Every write serializes the whole database to a temporary file next to the
//! target and renames it into place, so readers of the file never observe a
//! partial write. The in-memory view is only updated after the rename
//! succeeded.
//!
//! An open registry holds an exclusive lock file next to the database for its
//! whole lifetime, so two processes never work from diverging snapshots.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fslock::LockFile;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{InstallState, MemoryRegistry, Registry};
use crate::domain::InstalledBundleRecord;
use crate::error::{BmsError, Result, io as io_error, state};

/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

/// Lock file name, next to the database
pub const LOCK_FILE: &str = "bms.lock";

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    bundles: Vec<InstalledBundleRecord>,
}

/// JSON-file backed registry
pub struct FileRegistry {
    path: PathBuf,
    inner: MemoryRegistry,
    write_lock: Mutex<()>,
    process_lock: LockFile,
}

impl std::fmt::Debug for FileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRegistry")
            .field("path", &self.path)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl FileRegistry {
    /// Open the database at `path`, creating an empty one on first write
    ///
    /// Fails fast with `RegistryLocked` while another handle on the same
    /// database is open, in this process or another one.
    pub fn open(path: impl Into<PathBuf>, users: impl IntoIterator<Item = i32>) -> Result<Self> {
        let path = path.into();
        let process_lock = Self::lock(&path)?;
        let records = if path.exists() {
            Self::load(&path)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), bundles = records.len(), "registry opened");

        Ok(Self {
            inner: MemoryRegistry::with_records(users, records),
            path,
            write_lock: Mutex::new(()),
            process_lock,
        })
    }

    fn lock(path: &Path) -> Result<LockFile> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let lock_path = parent.join(LOCK_FILE);

        let mut lock = LockFile::open(&lock_path).map_err(|e| BmsError::IoError {
            message: format!("Failed to open lock file {}: {}", lock_path.display(), e),
        })?;
        let acquired = lock.try_lock().map_err(|e| BmsError::IoError {
            message: format!("Failed to lock {}: {}", lock_path.display(), e),
        })?;
        if !acquired {
            return Err(state::registry_locked(path));
        }
        debug!(path = %lock_path.display(), "registry lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Vec<InstalledBundleRecord>> {
        let corrupted = |reason: String| BmsError::RegistryCorrupted {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| corrupted(e.to_string()))?;
        let file: RegistryFile =
            serde_json::from_str(&content).map_err(|e| corrupted(e.to_string()))?;
        if file.version != FORMAT_VERSION {
            return Err(corrupted(format!(
                "unsupported format version {}",
                file.version
            )));
        }
        Ok(file.bundles)
    }

    fn persist(&self, bundles: Vec<InstalledBundleRecord>) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(io_error::registry_write_failed)?;

        let content = serde_json::to_string_pretty(&RegistryFile {
            version: FORMAT_VERSION,
            bundles,
        })
        .map_err(io_error::registry_write_failed)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(io_error::registry_write_failed)?;
        tmp.write_all(content.as_bytes())
            .map_err(io_error::registry_write_failed)?;
        tmp.as_file()
            .sync_all()
            .map_err(io_error::registry_write_failed)?;
        tmp.persist(&self.path)
            .map_err(|e| io_error::registry_write_failed(e.error))?;

        debug!(path = %self.path.display(), "registry persisted");
        Ok(())
    }

    fn snapshot_with(
        &self,
        change: impl FnOnce(&mut Vec<InstalledBundleRecord>),
    ) -> Vec<InstalledBundleRecord> {
        let mut bundles = self.inner.enumerate();
        change(&mut bundles);
        bundles
    }
}

impl Drop for FileRegistry {
    fn drop(&mut self) {
        let _ = self.process_lock.unlock();
    }
}

impl Registry for FileRegistry {
    fn get(&self, bundle_name: &str) -> Option<InstalledBundleRecord> {
        self.inner.get(bundle_name)
    }

    fn put(&self, record: &InstalledBundleRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        let snapshot = self.snapshot_with(|bundles| {
            bundles.retain(|b| b.bundle_name != record.bundle_name);
            bundles.push(record.clone());
            bundles.sort_by(|a, b| a.bundle_name.cmp(&b.bundle_name));
        });
        self.persist(snapshot)?;
        self.inner.put(record)
    }

    fn remove(&self, bundle_name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock();
        if self.inner.get(bundle_name).is_none() {
            return Ok(false);
        }
        let snapshot = self.snapshot_with(|bundles| {
            bundles.retain(|b| b.bundle_name != bundle_name);
        });
        self.persist(snapshot)?;
        self.inner.remove(bundle_name)
    }

    fn enumerate(&self) -> Vec<InstalledBundleRecord> {
        self.inner.enumerate()
    }

    fn update_install_state(&self, bundle_name: &str, state: InstallState) -> Result<()> {
        self.inner.update_install_state(bundle_name, state)
    }

    fn install_state(&self, bundle_name: &str) -> Option<InstallState> {
        self.inner.install_state(bundle_name)
    }

    fn get_all_users(&self) -> Vec<i32> {
        self.inner.get_all_users()
    }
}
