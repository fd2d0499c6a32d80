//! In-memory registry

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;

use super::{InstallState, InstallStateTable, Registry};
use crate::domain::{DEFAULT_USER_ID, InstalledBundleRecord};
use crate::error::Result;

/// Registry held entirely in memory
#[derive(Debug)]
pub struct MemoryRegistry {
    records: RwLock<HashMap<String, InstalledBundleRecord>>,
    states: InstallStateTable,
    users: RwLock<BTreeSet<i32>>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new([DEFAULT_USER_ID])
    }
}

impl MemoryRegistry {
    pub fn new(users: impl IntoIterator<Item = i32>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            states: InstallStateTable::new(),
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    /// Build a registry preloaded with committed records
    pub fn with_records(
        users: impl IntoIterator<Item = i32>,
        records: impl IntoIterator<Item = InstalledBundleRecord>,
    ) -> Self {
        let registry = Self::new(users);
        {
            let mut map = registry.records.write();
            for record in records {
                map.insert(record.bundle_name.clone(), record);
            }
        }
        registry
    }

    pub fn add_user(&self, user_id: i32) {
        self.users.write().insert(user_id);
    }
}

impl Registry for MemoryRegistry {
    fn get(&self, bundle_name: &str) -> Option<InstalledBundleRecord> {
        self.records.read().get(bundle_name).cloned()
    }

    fn put(&self, record: &InstalledBundleRecord) -> Result<()> {
        self.records
            .write()
            .insert(record.bundle_name.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, bundle_name: &str) -> Result<bool> {
        Ok(self.records.write().remove(bundle_name).is_some())
    }

    fn enumerate(&self) -> Vec<InstalledBundleRecord> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.bundle_name.cmp(&b.bundle_name));
        records
    }

    fn update_install_state(&self, bundle_name: &str, state: InstallState) -> Result<()> {
        self.states.transition(bundle_name, state)
    }

    fn install_state(&self, bundle_name: &str) -> Option<InstallState> {
        self.states.get(bundle_name)
    }

    fn get_all_users(&self) -> Vec<i32> {
        self.users.read().iter().copied().collect()
    }
}
