//! Overlay conflicts

use super::BmsError;

/// Creates an invalid overlay priority error
pub fn invalid_priority(name: impl Into<String>, priority: i32) -> BmsError {
    BmsError::InvalidPriority {
        name: name.into(),
        priority,
    }
}

/// Creates a missing target module error
pub fn target_module_not_existed(module: impl Into<String>, target: impl Into<String>) -> BmsError {
    BmsError::TargetModuleNotExisted {
        module: module.into(),
        target: target.into(),
    }
}

/// Creates an inconsistent version code error
pub fn inconsistent_version_code(bundle: impl Into<String>) -> BmsError {
    BmsError::InconsistentVersionCode {
        bundle: bundle.into(),
    }
}
