//! Per-bundle install-state machine
//!
//! `InstallStart -> InstallSuccess | InstallFail` and
//! `UninstallStart -> UninstallSuccess | UninstallFail`. A terminal state
//! clears the entry so the next transaction can start.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Result, state as state_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallState {
    InstallStart,
    InstallSuccess,
    InstallFail,
    UninstallStart,
    UninstallSuccess,
    UninstallFail,
}

impl InstallState {
    pub fn is_start(self) -> bool {
        matches!(self, InstallState::InstallStart | InstallState::UninstallStart)
    }

    /// The start state a terminal state must follow
    fn required_start(self) -> Option<InstallState> {
        match self {
            InstallState::InstallSuccess | InstallState::InstallFail => {
                Some(InstallState::InstallStart)
            }
            InstallState::UninstallSuccess | InstallState::UninstallFail => {
                Some(InstallState::UninstallStart)
            }
            InstallState::InstallStart | InstallState::UninstallStart => None,
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallState::InstallStart => "INSTALL_START",
            InstallState::InstallSuccess => "INSTALL_SUCCESS",
            InstallState::InstallFail => "INSTALL_FAIL",
            InstallState::UninstallStart => "UNINSTALL_START",
            InstallState::UninstallSuccess => "UNINSTALL_SUCCESS",
            InstallState::UninstallFail => "UNINSTALL_FAIL",
        };
        f.write_str(name)
    }
}

/// In-flight transaction states keyed by bundle name
#[derive(Debug, Default)]
pub struct InstallStateTable {
    states: Mutex<HashMap<String, InstallState>>,
}

impl InstallStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&self, bundle_name: &str, next: InstallState) -> Result<()> {
        let mut states = self.states.lock();
        let current = states.get(bundle_name).copied();
        trace!(bundle = bundle_name, ?current, %next, "install state transition");

        match (current, next.required_start()) {
            (None, None) => {
                states.insert(bundle_name.to_string(), next);
                Ok(())
            }
            (Some(current), Some(required)) if current == required => {
                states.remove(bundle_name);
                Ok(())
            }
            _ => Err(state_error::install_state_error(bundle_name)),
        }
    }

    pub fn get(&self, bundle_name: &str) -> Option<InstallState> {
        self.states.lock().get(bundle_name).copied()
    }
}
