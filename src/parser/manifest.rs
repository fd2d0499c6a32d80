//! Serde shapes of the on-disk package manifests
//!
//! `module.json` describes a HAP/HSP, `patch.json` describes a quick fix.

use serde::{Deserialize, Serialize};

use crate::domain::{BundleType, QuickFixType};

/// Manifest file name of a HAP/HSP package
pub const MODULE_MANIFEST: &str = "module.json";

/// Manifest file name of a quick fix package
pub const PATCH_MANIFEST: &str = "patch.json";

/// Role of a module within its bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Entry,
    #[default]
    Feature,
    Shared,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSection {
    pub bundle_name: String,
    pub version_code: u32,
    #[serde(default)]
    pub version_name: String,
    #[serde(default)]
    pub min_compatible_version_code: Option<u32>,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub release_type: String,
    #[serde(default)]
    pub bundle_type: BundleType,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub cpu_abi: String,
    #[serde(default)]
    pub native_library_path: String,
    #[serde(default)]
    pub target_bundle_name: String,
    #[serde(default)]
    pub target_priority: i32,
    #[serde(default)]
    pub allow_third_party_overlay: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSection {
    pub name: String,
    #[serde(rename = "type", default)]
    pub module_type: ModuleType,
    #[serde(default)]
    pub installation_free: bool,
    #[serde(default)]
    pub target_module_name: String,
    #[serde(default)]
    pub target_priority: i32,
}

/// Contents of `module.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub app: AppSection,
    pub module: ModuleSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAppSection {
    pub bundle_name: String,
    pub version_code: u32,
    #[serde(default)]
    pub version_name: String,
    pub patch_version_code: u32,
    #[serde(default)]
    pub patch_version_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchModuleSection {
    pub name: String,
    #[serde(rename = "type", default)]
    pub quick_fix_type: QuickFixType,
    #[serde(default)]
    pub cpu_abi: String,
    #[serde(default)]
    pub native_library_path: String,
}

/// Contents of `patch.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchManifest {
    pub app: PatchAppSection,
    pub module: PatchModuleSection,
}
