//! Registry of installed bundles
//!
//! The registry is the only shared mutable state of the install engine. It
//! stores one committed [`InstalledBundleRecord`] per bundle name and owns the
//! per-bundle install-state guard that serializes transactions on a bundle.
//!
//! Implementations:
//! - [`MemoryRegistry`]: in-memory map, multi-reader / single-writer
//! - [`FileRegistry`]: the same map persisted to a JSON database file

mod file;
mod memory;
mod state;

use crate::domain::InstalledBundleRecord;
use crate::error::Result;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;
pub use state::{InstallState, InstallStateTable};

/// Store of committed bundle records
pub trait Registry: Send + Sync {
    /// Committed record of a bundle; in-flight installs are not visible
    fn get(&self, bundle_name: &str) -> Option<InstalledBundleRecord>;

    /// Replace the record of `record.bundle_name` in a single write
    fn put(&self, record: &InstalledBundleRecord) -> Result<()>;

    /// Remove a record, returning whether it existed
    fn remove(&self, bundle_name: &str) -> Result<bool>;

    /// Snapshot of every committed record, ordered by bundle name
    fn enumerate(&self) -> Vec<InstalledBundleRecord>;

    /// Advance the install-state machine of a bundle
    ///
    /// Fails fast with `InstallStateError` when the transition is not allowed,
    /// e.g. a second `*Start` while one is already running.
    fn update_install_state(&self, bundle_name: &str, state: InstallState) -> Result<()>;

    /// Current in-flight state of a bundle, if any
    fn install_state(&self, bundle_name: &str) -> Option<InstallState>;

    /// Every OS user known to the service
    fn get_all_users(&self) -> Vec<i32>;
}
