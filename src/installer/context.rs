//! Per-call install context

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::{CandidateBundle, InstalledBundleRecord};
use crate::error::{Result, param};
use crate::transaction::TransactionState;

/// Everything one install call knows about its batch; never persisted
#[derive(Debug)]
pub struct InstallContext {
    pub bundle_name: String,
    pub candidates: BTreeMap<PathBuf, CandidateBundle>,
    /// Committed record at the time the bundle was locked
    pub existing: Option<InstalledBundleRecord>,
    state: TransactionState,
}

impl InstallContext {
    /// Build a context from a parsed batch
    pub fn new(candidates: BTreeMap<PathBuf, CandidateBundle>) -> Result<Self> {
        let bundle_name = candidates
            .values()
            .next()
            .map(|c| c.bundle_name.clone())
            .ok_or_else(|| param::invalid("install batch is empty"))?;
        Ok(Self {
            bundle_name,
            candidates,
            existing: None,
            state: TransactionState::Pending,
        })
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn advance(&mut self, next: TransactionState) {
        debug!(bundle = %self.bundle_name, from = %self.state, to = %next, "install state");
        self.state = next;
    }

    /// Bundle-level fields come from the first candidate; the batch has
    /// already been checked to agree on them
    pub fn primary(&self) -> Option<&CandidateBundle> {
        self.candidates.values().next()
    }

    pub fn is_update(&self) -> bool {
        self.existing.is_some()
    }
}
