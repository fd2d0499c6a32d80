//! Quick fix domain types
//!
//! A quick fix patches an installed bundle at one specific version without a
//! full reinstall. Hot reloads are debug-only; patches are versioned.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of quick fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuickFixType {
    #[default]
    Patch,
    HotReload,
}

impl fmt::Display for QuickFixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickFixType::Patch => f.write_str("patch"),
            QuickFixType::HotReload => f.write_str("hotReload"),
        }
    }
}

/// Per-module payload of a quick fix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HqfInfo {
    pub module_name: String,
    pub cpu_abi: String,
    pub native_library_path: String,
    pub hqf_path: PathBuf,
}

impl HqfInfo {
    pub fn has_native_so(&self) -> bool {
        !self.cpu_abi.is_empty() && !self.native_library_path.is_empty()
    }
}

/// A parsed quick fix package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppQuickFix {
    pub bundle_name: String,
    /// Version of the installed bundle this fix applies to
    pub version_code: u32,
    pub version_name: String,
    pub patch_version_code: u32,
    pub patch_version_name: String,
    pub quick_fix_type: QuickFixType,
    pub hqf_infos: Vec<HqfInfo>,
}

/// Quick fix currently applied to an installed bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedQuickFix {
    pub quick_fix_type: QuickFixType,
    pub patch_version_code: u32,
    pub patch_version_name: String,
    pub modules: Vec<String>,
    pub deploy_dir: PathBuf,
}
