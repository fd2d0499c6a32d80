//! Installed bundle records
//!
//! The committed registry entry for a bundle. Records are plain data; the
//! registry serializes them as a whole, keyed by bundle name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AppliedQuickFix, BundleType, CandidateBundle, CandidateModule, ProvisionType};

/// Install state of a bundle for one OS user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInstallState {
    pub enabled: bool,
    pub removable: bool,
    pub install_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl UserInstallState {
    pub fn new(removable: bool, now: DateTime<Utc>) -> Self {
        Self {
            enabled: true,
            removable,
            install_time: now,
            update_time: now,
        }
    }
}

/// Overlay role of an installed bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OverlayState {
    #[default]
    None,
    /// Some modules overlay other modules of the same bundle
    Internal,
    /// The bundle overlays modules of another bundle
    External {
        #[serde(rename = "targetBundleName")]
        target_bundle_name: String,
    },
}

/// A committed module of an installed bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledModule {
    pub module_name: String,
    /// Version code of the package this module was installed from
    pub version_code: u32,
    pub is_entry: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_module_name: String,
    #[serde(default)]
    pub target_priority: i32,
    #[serde(default)]
    pub is_installation_free: bool,
    pub code_path: PathBuf,
}

impl InstalledModule {
    pub fn from_candidate(module: &CandidateModule, version_code: u32, code_path: PathBuf) -> Self {
        Self {
            module_name: module.module_name.clone(),
            version_code,
            is_entry: module.is_entry,
            target_module_name: module.target_module_name.clone(),
            target_priority: module.target_priority,
            is_installation_free: module.is_installation_free,
            code_path,
        }
    }

    pub fn is_overlay(&self) -> bool {
        !self.target_module_name.is_empty()
    }
}

/// The committed registry entry for one bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledBundleRecord {
    pub bundle_name: String,
    pub version_code: u32,
    pub version_name: String,
    pub min_compatible_version_code: u32,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub release_type: String,
    #[serde(default)]
    pub bundle_type: BundleType,
    #[serde(default)]
    pub is_singleton: bool,
    #[serde(default)]
    pub is_debug: bool,
    pub app_id: String,
    pub signature_fingerprint: String,
    #[serde(default)]
    pub distribution_type: String,
    #[serde(default)]
    pub provision_type: ProvisionType,
    #[serde(default)]
    pub cpu_abi: String,
    #[serde(default)]
    pub native_library_path: String,
    #[serde(default)]
    pub target_priority: i32,
    #[serde(default)]
    pub allow_third_party_overlay: bool,
    #[serde(default)]
    pub is_system_app: bool,

    pub modules: BTreeMap<String, InstalledModule>,
    pub user_states: BTreeMap<i32, UserInstallState>,
    #[serde(default)]
    pub overlay_state: OverlayState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_quick_fix: Option<AppliedQuickFix>,

    pub install_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl InstalledBundleRecord {
    /// Create a fresh record carrying the bundle-level fields of `candidate`
    ///
    /// Modules and user states start empty; the installer fills them in.
    pub fn from_candidate(candidate: &CandidateBundle, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            bundle_name: candidate.bundle_name.clone(),
            version_code: 0,
            version_name: String::new(),
            min_compatible_version_code: 0,
            vendor: String::new(),
            release_type: String::new(),
            bundle_type: BundleType::default(),
            is_singleton: false,
            is_debug: false,
            app_id: String::new(),
            signature_fingerprint: String::new(),
            distribution_type: String::new(),
            provision_type: ProvisionType::default(),
            cpu_abi: String::new(),
            native_library_path: String::new(),
            target_priority: 0,
            allow_third_party_overlay: false,
            is_system_app: false,
            modules: BTreeMap::new(),
            user_states: BTreeMap::new(),
            overlay_state: OverlayState::None,
            applied_quick_fix: None,
            install_time: now,
            update_time: now,
        };
        record.apply_candidate_fields(candidate);
        record
    }

    /// Overwrite bundle-level fields with those of a newer candidate
    pub fn apply_candidate_fields(&mut self, candidate: &CandidateBundle) {
        self.version_code = candidate.version_code;
        self.version_name.clone_from(&candidate.version_name);
        self.min_compatible_version_code = candidate.min_compatible_version_code;
        self.vendor.clone_from(&candidate.vendor);
        self.release_type.clone_from(&candidate.release_type);
        self.bundle_type = candidate.bundle_type;
        self.is_singleton = candidate.is_singleton;
        self.is_debug = candidate.is_debug;
        self.app_id.clone_from(&candidate.app_id);
        self.signature_fingerprint
            .clone_from(&candidate.signature_fingerprint);
        self.distribution_type.clone_from(&candidate.distribution_type);
        self.provision_type = candidate.provision_type;
        if !candidate.cpu_abi.is_empty() {
            self.cpu_abi.clone_from(&candidate.cpu_abi);
        }
        if !candidate.native_library_path.is_empty() {
            self.native_library_path
                .clone_from(&candidate.native_library_path);
        }
        self.target_priority = candidate.target_priority;
        self.allow_third_party_overlay = candidate.allow_third_party_overlay;
    }

    /// Recompute the overlay role from the installed modules
    pub fn refresh_overlay_state(&mut self, target_bundle_name: &str) {
        self.overlay_state = if !target_bundle_name.is_empty() {
            OverlayState::External {
                target_bundle_name: target_bundle_name.to_string(),
            }
        } else if self.modules.values().any(InstalledModule::is_overlay) {
            OverlayState::Internal
        } else {
            OverlayState::None
        };
    }

    pub fn is_installed_for(&self, user_id: i32) -> bool {
        self.user_states.contains_key(&user_id)
    }

    pub fn is_external_overlay(&self) -> bool {
        matches!(self.overlay_state, OverlayState::External { .. })
    }

    pub fn entry_module(&self) -> Option<&InstalledModule> {
        self.modules.values().find(|m| m.is_entry)
    }

    /// Directory holding this bundle's module code directories
    pub fn bundle_code_dir(&self, app_root: &std::path::Path) -> PathBuf {
        app_root.join(&self.bundle_name)
    }
}
