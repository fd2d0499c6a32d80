//! Install and uninstall request parameters

/// User that owns installs when the caller does not name one
pub const DEFAULT_USER_ID: i32 = 100;

/// User that singleton bundles are recorded under
pub const SINGLETON_USER_ID: i32 = 0;

/// Parameters of an install request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallParam {
    pub user_id: i32,
    /// Install for every user known to the registry
    pub all_users: bool,
    pub allow_downgrade: bool,
    pub removable: bool,
    /// Fail when an overlay module's target cannot be resolved
    pub require_overlay_target: bool,
    /// Preinstalled system bundle
    pub is_system_app: bool,
}

impl Default for InstallParam {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID,
            all_users: false,
            allow_downgrade: false,
            removable: true,
            require_overlay_target: false,
            is_system_app: false,
        }
    }
}

/// Parameters of an uninstall request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallParam {
    pub user_id: i32,
    /// Remove only this module instead of the whole bundle
    pub module_name: Option<String>,
}

impl Default for UninstallParam {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID,
            module_name: None,
        }
    }
}
