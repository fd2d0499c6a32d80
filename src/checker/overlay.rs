//! Overlay module and overlay bundle rules
//!
//! An internal overlay module replaces resources of another module of the
//! same bundle. An external overlay bundle (non-empty `target_bundle_name`)
//! replaces resources of modules of another, already committed bundle.
//!
//! Target resolution looks at the install batch first and only then at the
//! committed registry record, so a target shipped in the same batch always
//! wins over an installed module of the same name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::{
    CandidateBundle, CandidateModule, InstallParam, InstalledBundleRecord, MAX_OVERLAY_PRIORITY,
    MIN_OVERLAY_PRIORITY,
};
use crate::error::{BmsError, Result, overlay};
use crate::registry::Registry;

/// Runs the overlay rules against committed registry state
pub struct OverlayChecker<'a> {
    registry: &'a dyn Registry,
}

impl<'a> OverlayChecker<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    /// Whether any candidate of the batch declares overlay intent
    pub fn is_needed(batch: &BTreeMap<PathBuf, CandidateBundle>) -> bool {
        batch
            .values()
            .any(|c| c.is_external_overlay() || c.has_overlay_module())
    }

    /// Run every applicable overlay rule for a batch
    pub fn check(
        &self,
        batch: &BTreeMap<PathBuf, CandidateBundle>,
        existing: Option<&InstalledBundleRecord>,
        param: &InstallParam,
    ) -> Result<()> {
        check_internal_bundle(batch, existing, param)?;
        for candidate in batch.values().filter(|c| c.is_external_overlay()) {
            // Uncommitted bundles are invisible to `get`, so an in-flight
            // target reads as missing
            let target = self.registry.get(&candidate.target_bundle_name);
            check_external_bundle(candidate, target.as_ref(), param)?;
        }
        Ok(())
    }
}

/// Overlay rules for modules targeting their own bundle
///
/// External overlay candidates only take part in the version consistency
/// rule here; their targets are resolved by [`check_external_bundle`].
pub fn check_internal_bundle(
    batch: &BTreeMap<PathBuf, CandidateBundle>,
    existing: Option<&InstalledBundleRecord>,
    param: &InstallParam,
) -> Result<()> {
    for candidate in batch.values() {
        for module in candidate.modules.values().filter(|m| m.is_overlay()) {
            check_module(candidate, module)?;
            if candidate.is_external_overlay() {
                continue;
            }
            resolve_internal_target(candidate, module, batch, existing, param)?;
        }
    }
    check_version_consistency(batch, existing)
}

/// Overlay rules for a bundle targeting another installed bundle
pub fn check_external_bundle(
    candidate: &CandidateBundle,
    target: Option<&InstalledBundleRecord>,
    param: &InstallParam,
) -> Result<()> {
    if candidate.target_bundle_name == candidate.bundle_name {
        return Err(BmsError::InvalidTargetBundleName {
            bundle: candidate.bundle_name.clone(),
        });
    }
    check_priority(&candidate.bundle_name, candidate.target_priority)?;

    let overlay_modules: Vec<&CandidateModule> = candidate
        .modules
        .values()
        .filter(|m| m.is_overlay())
        .collect();
    for module in &overlay_modules {
        check_module(candidate, module)?;
    }

    let Some(target) = target else {
        if param.require_overlay_target {
            return Err(BmsError::TargetBundleNotExisted {
                target: candidate.target_bundle_name.clone(),
            });
        }
        debug!(
            bundle = %candidate.bundle_name,
            target = %candidate.target_bundle_name,
            "overlay target bundle not installed yet"
        );
        return Ok(());
    };

    if target.is_external_overlay() {
        return Err(BmsError::TargetBundleIsOverlay {
            target: target.bundle_name.clone(),
        });
    }
    if target.bundle_type.is_installation_free() {
        return Err(BmsError::TargetBundleIsService {
            target: target.bundle_name.clone(),
        });
    }

    for module in overlay_modules {
        match target.modules.get(&module.target_module_name) {
            Some(target_module) if target_module.is_overlay() => {
                return Err(BmsError::TargetModuleIsOverlay {
                    module: module.module_name.clone(),
                    target: module.target_module_name.clone(),
                });
            }
            Some(_) => {}
            None if param.require_overlay_target => {
                return Err(BmsError::MissingOverlayModule {
                    target: target.bundle_name.clone(),
                    module: module.target_module_name.clone(),
                });
            }
            None => {}
        }
    }

    let third_party_allowed = target.is_system_app && target.allow_third_party_overlay;
    if target.signature_fingerprint != candidate.signature_fingerprint && !third_party_allowed {
        return Err(BmsError::DifferentSignatureCertificate {
            bundle: candidate.bundle_name.clone(),
            target: target.bundle_name.clone(),
        });
    }
    Ok(())
}

/// Rules that depend on the overlay module alone
fn check_module(bundle: &CandidateBundle, module: &CandidateModule) -> Result<()> {
    if module.is_entry {
        return Err(BmsError::OverlayEntryModule {
            module: module.module_name.clone(),
        });
    }
    if bundle.bundle_type.is_installation_free() || module.is_installation_free {
        return Err(BmsError::OverlayServiceBundle {
            bundle: bundle.bundle_name.clone(),
        });
    }
    check_priority(&module.module_name, module.target_priority)?;
    if module.target_module_name == module.module_name {
        return Err(BmsError::InvalidModuleName {
            module: module.module_name.clone(),
        });
    }
    Ok(())
}

fn check_priority(name: &str, priority: i32) -> Result<()> {
    if (MIN_OVERLAY_PRIORITY..=MAX_OVERLAY_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(overlay::invalid_priority(name, priority))
    }
}

fn resolve_internal_target(
    candidate: &CandidateBundle,
    module: &CandidateModule,
    batch: &BTreeMap<PathBuf, CandidateBundle>,
    existing: Option<&InstalledBundleRecord>,
    param: &InstallParam,
) -> Result<()> {
    let in_batch = batch
        .values()
        .filter(|c| c.bundle_name == candidate.bundle_name)
        .find_map(|c| c.modules.get(&module.target_module_name));

    let target_is_overlay = match in_batch {
        Some(target) => Some(target.is_overlay()),
        None => existing
            .and_then(|record| record.modules.get(&module.target_module_name))
            .map(|target| target.is_overlay()),
    };

    match target_is_overlay {
        Some(true) => Err(BmsError::TargetModuleIsOverlay {
            module: module.module_name.clone(),
            target: module.target_module_name.clone(),
        }),
        Some(false) => Ok(()),
        None if param.require_overlay_target => Err(overlay::target_module_not_existed(
            &module.module_name,
            &module.target_module_name,
        )),
        None => Ok(()),
    }
}

/// All modules of a bundle share one version code once overlays are involved
fn check_version_consistency(
    batch: &BTreeMap<PathBuf, CandidateBundle>,
    existing: Option<&InstalledBundleRecord>,
) -> Result<()> {
    let Some(first) = batch.values().next() else {
        return Ok(());
    };

    let retained: Vec<_> = existing
        .map(|record| {
            record
                .modules
                .values()
                .filter(|m| !batch.values().any(|c| c.modules.contains_key(&m.module_name)))
                .collect()
        })
        .unwrap_or_default();

    let overlay_involved = batch
        .values()
        .any(|c| c.is_external_overlay() || c.has_overlay_module())
        || retained.iter().any(|m| m.is_overlay())
        || existing.is_some_and(InstalledBundleRecord::is_external_overlay);
    if !overlay_involved {
        return Ok(());
    }

    let version = first.version_code;
    let consistent = batch.values().all(|c| c.version_code == version)
        && retained.iter().all(|m| m.version_code == version);
    if consistent {
        Ok(())
    } else {
        Err(overlay::inconsistent_version_code(&first.bundle_name))
    }
}
