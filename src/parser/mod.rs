//! Package manifest parsing
//!
//! This module handles:
//! - Validating package paths handed in by the caller
//! - Parsing `module.json` into a [`CandidateBundle`]
//! - Parsing `patch.json` into an [`AppQuickFix`]
//!
//! Parsing is read-only and happens before a transaction takes its bundle
//! lock, since the lock key is the bundle name found in the manifest.

pub mod manifest;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{AppQuickFix, CandidateBundle, CandidateModule, HqfInfo};
use crate::error::{Result, param};

pub use manifest::{MODULE_MANIFEST, ModuleManifest, ModuleType, PATCH_MANIFEST, PatchManifest};

/// Canonicalize and de-duplicate caller-supplied package paths
///
/// Every path must be an existing directory containing `manifest_name`.
pub fn resolve_package_paths(paths: &[PathBuf], manifest_name: &str) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(param::invalid("no package paths given"));
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(paths.len());
    for path in paths {
        let canonical = dunce::canonicalize(path).map_err(|_| param::invalid_path(path))?;
        if !canonical.is_dir() || !canonical.join(manifest_name).is_file() {
            return Err(param::invalid_path(path));
        }
        if seen.insert(canonical.clone()) {
            resolved.push(canonical);
        }
    }
    Ok(resolved)
}

fn read_manifest<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| param::manifest_parse_failed(path, e))?;
    serde_json::from_str(&content).map_err(|e| param::manifest_parse_failed(path, e))
}

/// Parse one HAP/HSP package directory into a single-module candidate
pub fn parse_hap(hap_path: &Path) -> Result<CandidateBundle> {
    let manifest_path = hap_path.join(MODULE_MANIFEST);
    let manifest: ModuleManifest = read_manifest(&manifest_path)?;
    debug!(
        bundle = %manifest.app.bundle_name,
        module = %manifest.module.name,
        "parsed module manifest"
    );
    candidate_from_manifest(manifest, hap_path)
}

fn candidate_from_manifest(manifest: ModuleManifest, hap_path: &Path) -> Result<CandidateBundle> {
    let ModuleManifest { app, module } = manifest;
    if module.name.is_empty() {
        return Err(param::manifest_parse_failed(
            hap_path.join(MODULE_MANIFEST),
            "module name is empty",
        ));
    }

    let candidate_module = CandidateModule {
        module_name: module.name.clone(),
        is_entry: module.module_type == ModuleType::Entry,
        target_module_name: module.target_module_name,
        target_priority: module.target_priority,
        is_installation_free: module.installation_free,
        hap_path: hap_path.to_path_buf(),
    };

    let candidate = CandidateBundle {
        min_compatible_version_code: app.min_compatible_version_code.unwrap_or(app.version_code),
        bundle_name: app.bundle_name,
        version_code: app.version_code,
        version_name: app.version_name,
        vendor: app.vendor,
        release_type: app.release_type,
        bundle_type: app.bundle_type,
        is_singleton: app.singleton,
        is_debug: app.debug,
        modules: BTreeMap::from([(module.name, candidate_module)]),
        cpu_abi: app.cpu_abi,
        native_library_path: app.native_library_path,
        target_bundle_name: app.target_bundle_name,
        target_priority: app.target_priority,
        allow_third_party_overlay: app.allow_third_party_overlay,
        ..CandidateBundle::default()
    };
    candidate.validate()?;
    Ok(candidate)
}

/// Parse every package of a batch, keyed by package path
pub fn parse_batch(paths: &[PathBuf]) -> Result<BTreeMap<PathBuf, CandidateBundle>> {
    paths
        .iter()
        .map(|path| parse_hap(path).map(|candidate| (path.clone(), candidate)))
        .collect()
}

/// Parse one quick fix package directory
pub fn parse_hqf(hqf_path: &Path) -> Result<AppQuickFix> {
    let manifest_path = hqf_path.join(PATCH_MANIFEST);
    let PatchManifest { app, module } = read_manifest(&manifest_path)?;
    if app.bundle_name.is_empty() {
        return Err(crate::error::BmsError::EmptyBundleName {
            path: manifest_path.display().to_string(),
        });
    }
    if module.name.is_empty() {
        return Err(param::manifest_parse_failed(
            &manifest_path,
            "module name is empty",
        ));
    }

    Ok(AppQuickFix {
        bundle_name: app.bundle_name,
        version_code: app.version_code,
        version_name: app.version_name,
        patch_version_code: app.patch_version_code,
        patch_version_name: app.patch_version_name,
        quick_fix_type: module.quick_fix_type,
        hqf_infos: vec![HqfInfo {
            module_name: module.name,
            cpu_abi: module.cpu_abi,
            native_library_path: module.native_library_path,
            hqf_path: hqf_path.to_path_buf(),
        }],
    })
}

/// Parse every quick fix package of a batch, in the order given
pub fn parse_hqf_batch(paths: &[PathBuf]) -> Result<Vec<AppQuickFix>> {
    paths.iter().map(|path| parse_hqf(path)).collect()
}
