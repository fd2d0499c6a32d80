//! Transaction state and lifecycle errors

use super::BmsError;

/// Creates a concurrent transaction error
pub fn install_state_error(bundle: impl Into<String>) -> BmsError {
    BmsError::InstallStateError {
        bundle: bundle.into(),
    }
}

/// Creates a bundle not installed error
pub fn not_installed(bundle: impl Into<String>) -> BmsError {
    BmsError::BundleNotInstalled {
        bundle: bundle.into(),
    }
}

/// Creates a registry lock contention error
pub fn registry_locked(path: &std::path::Path) -> BmsError {
    BmsError::RegistryLocked {
        path: path.display().to_string(),
    }
}
