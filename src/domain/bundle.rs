//! Candidate bundle domain types
//!
//! A candidate is the parsed, not-yet-committed description of one package
//! in an install batch. Each HAP/HSP parses into its own `CandidateBundle`
//! holding exactly one module; the batch is the set of candidates.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::SigningIdentity;
use crate::error::{BmsError, Result};

/// Lowest valid overlay priority
pub const MIN_OVERLAY_PRIORITY: i32 = 1;

/// Highest valid overlay priority
pub const MAX_OVERLAY_PRIORITY: i32 = 100;

/// Packaging type of a bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BundleType {
    #[default]
    App,
    /// Installation-free atomic service
    AtomicService,
    /// Shared library bundle (HSP only)
    Shared,
}

impl BundleType {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleType::App => "app",
            BundleType::AtomicService => "atomicService",
            BundleType::Shared => "shared",
        }
    }

    pub fn is_installation_free(self) -> bool {
        self == BundleType::AtomicService
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provision profile type the package was signed with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionType {
    Debug,
    #[default]
    Release,
}

impl fmt::Display for ProvisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionType::Debug => f.write_str("debug"),
            ProvisionType::Release => f.write_str("release"),
        }
    }
}

/// One HAP/HSP module of a candidate bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateModule {
    pub module_name: String,
    pub is_entry: bool,
    /// Non-empty marks this module as an overlay module
    pub target_module_name: String,
    pub target_priority: i32,
    pub is_installation_free: bool,
    /// Package directory this module was parsed from
    pub hap_path: PathBuf,
}

impl CandidateModule {
    pub fn is_overlay(&self) -> bool {
        !self.target_module_name.is_empty()
    }
}

/// A parsed bundle description awaiting installation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateBundle {
    pub bundle_name: String,
    pub version_code: u32,
    pub version_name: String,
    pub min_compatible_version_code: u32,
    pub vendor: String,
    pub release_type: String,
    pub bundle_type: BundleType,
    pub is_singleton: bool,
    pub is_debug: bool,

    // Filled from the signing identity
    pub app_id: String,
    pub signature_fingerprint: String,
    pub distribution_type: String,
    pub provision_type: ProvisionType,

    pub modules: BTreeMap<String, CandidateModule>,
    pub cpu_abi: String,
    pub native_library_path: String,

    /// Non-empty marks this bundle as an external overlay of another bundle
    pub target_bundle_name: String,
    pub target_priority: i32,
    pub allow_third_party_overlay: bool,
}

impl CandidateBundle {
    /// Check the structural invariants of a parsed candidate
    pub fn validate(&self) -> Result<()> {
        if self.bundle_name.is_empty() {
            return Err(BmsError::EmptyBundleName {
                path: self.source_display(),
            });
        }
        if self.modules.is_empty() {
            return Err(crate::error::param::invalid(format!(
                "bundle '{}' has no modules",
                self.bundle_name
            )));
        }
        Ok(())
    }

    /// Copy the signing identity onto the candidate
    ///
    /// A manifest declaring a debuggable bundle must be signed with a debug
    /// profile.
    pub fn apply_identity(&mut self, identity: &SigningIdentity) -> Result<()> {
        if self.is_debug && !identity.is_debug {
            return Err(crate::error::signature::verification_failed(
                self.source_display(),
                "debug bundle is signed with a release profile",
            ));
        }
        self.app_id.clone_from(&identity.app_id);
        self.signature_fingerprint.clone_from(&identity.fingerprint);
        self.distribution_type.clone_from(&identity.distribution_type);
        self.provision_type = identity.provision_type;
        Ok(())
    }

    pub fn is_installation_free(&self) -> bool {
        self.bundle_type.is_installation_free()
            || self.modules.values().any(|m| m.is_installation_free)
    }

    pub fn is_external_overlay(&self) -> bool {
        !self.target_bundle_name.is_empty()
    }

    pub fn has_overlay_module(&self) -> bool {
        self.modules.values().any(CandidateModule::is_overlay)
    }

    pub fn entry_modules(&self) -> impl Iterator<Item = &CandidateModule> {
        self.modules.values().filter(|m| m.is_entry)
    }

    fn source_display(&self) -> String {
        self.modules
            .values()
            .next()
            .map(|m| m.hap_path.display().to_string())
            .unwrap_or_default()
    }
}
