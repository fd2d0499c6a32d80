//! Per-bundle install-state guard

use tracing::{debug, warn};

use crate::error::Result;
use crate::registry::{InstallState, Registry};

/// Holds a bundle's `*Start` state for the lifetime of a transaction
///
/// Dropping an unfinished guard records the matching failure state, so the
/// bundle is released on every exit path including unwinding.
pub struct InstallStateGuard<'a> {
    registry: &'a dyn Registry,
    bundle_name: String,
    start: InstallState,
    finished: bool,
}

impl<'a> InstallStateGuard<'a> {
    /// Enter `start` for `bundle_name`, failing fast if another transaction
    /// holds the bundle
    pub fn acquire(
        registry: &'a dyn Registry,
        bundle_name: &str,
        start: InstallState,
    ) -> Result<Self> {
        registry.update_install_state(bundle_name, start)?;
        debug!(bundle = bundle_name, state = %start, "bundle locked");
        Ok(Self {
            registry,
            bundle_name: bundle_name.to_string(),
            start,
            finished: false,
        })
    }

    pub fn bundle_name(&self) -> &str {
        &self.bundle_name
    }

    /// Release the bundle with the success state
    pub fn succeed(mut self) -> Result<()> {
        self.finished = true;
        let state = self.outcome(true);
        self.registry.update_install_state(&self.bundle_name, state)?;
        debug!(bundle = %self.bundle_name, %state, "bundle released");
        Ok(())
    }

    fn outcome(&self, success: bool) -> InstallState {
        match (self.start, success) {
            (InstallState::UninstallStart, true) => InstallState::UninstallSuccess,
            (InstallState::UninstallStart, false) => InstallState::UninstallFail,
            (_, true) => InstallState::InstallSuccess,
            (_, false) => InstallState::InstallFail,
        }
    }
}

impl Drop for InstallStateGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let state = self.outcome(false);
        if let Err(e) = self.registry.update_install_state(&self.bundle_name, state) {
            warn!(bundle = %self.bundle_name, "Failed to release install state: {}", e);
        } else {
            debug!(bundle = %self.bundle_name, %state, "bundle released");
        }
    }
}
