//! Transaction support for atomic installs
//!
//! A [`Transaction`] owns the staging directory of one install, update or
//! uninstall and remembers every change it made to the code directories, so
//! that a failure anywhere before [`Transaction::commit`] leaves the file
//! system exactly as it was.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new(&paths.staging_dir())?;
//! let staged = transaction.stage_path("entry");
//! extractor.extract(hap_path, &staged)?;
//!
//! // Swap the staged module into place, keeping the old one aside
//! transaction.replace_dir(&staged, &code_dir)?;
//!
//! registry.put(&record)?;
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{BmsError, Result, io as io_error};

/// Lifecycle of an install transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Checking,
    Staging,
    Committing,
    Done,
    RolledBack,
}

impl TransactionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionState::Done | TransactionState::RolledBack)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Pending => "pending",
            TransactionState::Checking => "checking",
            TransactionState::Staging => "staging",
            TransactionState::Committing => "committing",
            TransactionState::Done => "done",
            TransactionState::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}

/// A directory moved aside while its replacement is installed
#[derive(Debug)]
struct Backup {
    /// Original location
    path: PathBuf,
    /// Holder directory; the moved directory lives at `holder/content`
    holder: TempDir,
}

impl Backup {
    fn content(&self) -> PathBuf {
        self.holder.path().join("content")
    }
}

/// A transaction over the code directories of one bundle
#[derive(Debug)]
pub struct Transaction {
    /// Extraction target for this transaction, removed on drop
    staging: TempDir,

    /// Directories moved aside, in the order they were moved
    backups: Vec<Backup>,

    /// Directories moved into place during this transaction
    installed_dirs: Vec<PathBuf>,

    /// Directories created during this transaction
    created_dirs: HashSet<PathBuf>,

    /// Whether the transaction has been committed
    committed: bool,
}

impl Transaction {
    /// Start a transaction with a fresh staging directory under `staging_root`
    pub fn new(staging_root: &Path) -> Result<Self> {
        fs::create_dir_all(staging_root)
            .map_err(|e| io_error::temp_dir_failed(staging_root, &e))?;
        let staging = tempfile::Builder::new()
            .prefix("txn-")
            .tempdir_in(staging_root)
            .map_err(|e| io_error::temp_dir_failed(staging_root, &e))?;
        debug!(staging = %staging.path().display(), "transaction started");

        Ok(Self {
            staging,
            backups: Vec::new(),
            installed_dirs: Vec::new(),
            created_dirs: HashSet::new(),
            committed: false,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Staging location for one module
    pub fn stage_path(&self, module_name: &str) -> PathBuf {
        self.staging.path().join(module_name)
    }

    /// Track a directory that was created during this transaction
    pub fn track_dir_created(&mut self, path: impl Into<PathBuf>) {
        self.created_dirs.insert(path.into());
    }

    /// Create `path` and every missing parent, tracking what was created
    pub fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(dir) = current {
            if dir.exists() {
                break;
            }
            missing.push(dir.to_path_buf());
            current = dir.parent();
        }

        fs::create_dir_all(path).map_err(|e| io_error::extraction_failed(path, &e))?;
        for dir in missing {
            self.track_dir_created(dir);
        }
        Ok(())
    }

    /// Move `staged` to `target`, keeping any existing `target` as a backup
    pub fn replace_dir(&mut self, staged: &Path, target: &Path) -> Result<()> {
        if target.exists() {
            self.move_aside(target)?;
        }
        if let Some(parent) = target.parent() {
            self.create_dir_all(parent)?;
        }
        fs::rename(staged, target).map_err(|e| io_error::extraction_failed(target, &e))?;
        self.installed_dirs.push(target.to_path_buf());
        debug!(target = %target.display(), "module directory swapped in");
        Ok(())
    }

    /// Remove `target`, restorable until the transaction commits
    pub fn remove_dir(&mut self, target: &Path) -> Result<()> {
        if target.exists() {
            self.move_aside(target)?;
        }
        Ok(())
    }

    fn move_aside(&mut self, target: &Path) -> Result<()> {
        let parent = target.parent().ok_or_else(|| BmsError::InvalidFilePath {
            path: target.display().to_string(),
        })?;
        let holder = tempfile::Builder::new()
            .prefix(".bak-")
            .tempdir_in(parent)
            .map_err(|e| io_error::temp_dir_failed(parent, &e))?;
        let backup = Backup {
            path: target.to_path_buf(),
            holder,
        };
        fs::rename(target, backup.content())
            .map_err(|e| io_error::extraction_failed(target, &e))?;
        self.backups.push(backup);
        Ok(())
    }

    /// Commit the transaction (prevent rollback) and discard backups
    pub fn commit(mut self) {
        self.committed = true;
        for backup in self.backups.drain(..) {
            if let Err(e) = backup.holder.close() {
                warn!(path = %backup.path.display(), "Failed to remove backup: {}", e);
            }
        }
        debug!("transaction committed");
    }

    /// Manually trigger a rollback
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        // Remove installed directories (newest first)
        for path in self.installed_dirs.drain(..).rev() {
            if !path.exists() {
                continue;
            }
            if let Err(e) = fs::remove_dir_all(&path) {
                warn!(path = %path.display(), "Failed to remove installed directory: {}", e);
            }
        }

        // Restore backups (newest first)
        for backup in self.backups.drain(..).rev() {
            if let Err(e) = fs::rename(backup.content(), &backup.path) {
                warn!(path = %backup.path.display(), "Failed to restore backup: {}", e);
            }
        }

        // Remove created directories (in reverse order to handle nesting)
        let mut dirs: Vec<_> = self.created_dirs.drain().collect();
        dirs.sort_by_key(|b| std::cmp::Reverse(b.components().count()));
        for path in dirs {
            let is_empty = fs::read_dir(&path)
                .map(|mut d| d.next().is_none())
                .unwrap_or(false);
            if is_empty {
                let _ = fs::remove_dir(&path);
            }
        }
        debug!("transaction rolled back");
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed {
            // Automatic rollback on drop if not committed
            self.rollback();
        }
    }
}
