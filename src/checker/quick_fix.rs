//! Quick fix (patch / hot reload) rules

use std::collections::HashSet;

use crate::domain::{AppQuickFix, InstalledBundleRecord, ProvisionType, QuickFixType};
use crate::error::{BmsError, Result, param, quick_fix};

/// All packages of a quick fix batch must describe the same fix
pub fn check_app_quick_fix_infos(batch: &[AppQuickFix]) -> Result<()> {
    let mut fixes = batch.iter();
    let Some(first) = fixes.next() else {
        return Err(param::invalid("quick fix batch is empty"));
    };

    for fix in fixes {
        if fix.bundle_name != first.bundle_name {
            return Err(quick_fix::info_not_same("bundle name"));
        }
        if fix.version_code != first.version_code {
            return Err(quick_fix::info_not_same("version code"));
        }
        if fix.patch_version_code != first.patch_version_code {
            return Err(quick_fix::info_not_same("patch version code"));
        }
        if fix.quick_fix_type != first.quick_fix_type {
            return Err(quick_fix::info_not_same("quick fix type"));
        }
    }

    let mut modules = HashSet::new();
    for info in batch.iter().flat_map(|fix| &fix.hqf_infos) {
        if !modules.insert(info.module_name.as_str()) {
            return Err(BmsError::QuickFixModuleNameDuplicate {
                module: info.module_name.clone(),
            });
        }
    }
    Ok(())
}

/// Reconcile native library metadata across the batch
///
/// The first complete (abi, library path) pair, in the order the packages were
/// given, is canonical. Modules without native metadata inherit it; any other
/// pair is rejected.
pub fn check_multi_native_so(batch: &mut [AppQuickFix]) -> Result<()> {
    let canonical = batch
        .iter()
        .flat_map(|fix| &fix.hqf_infos)
        .find(|info| info.has_native_so())
        .map(|info| (info.cpu_abi.clone(), info.native_library_path.clone()));
    let Some((abi, lib_path)) = canonical else {
        return Ok(());
    };

    for info in batch.iter_mut().flat_map(|fix| fix.hqf_infos.iter_mut()) {
        if info.cpu_abi.is_empty() && info.native_library_path.is_empty() {
            info.cpu_abi.clone_from(&abi);
            info.native_library_path.clone_from(&lib_path);
        } else if info.cpu_abi != abi || info.native_library_path != lib_path {
            return Err(quick_fix::so_incompatible(&info.module_name));
        }
    }
    Ok(())
}

/// Merge a checked batch into one quick fix carrying every module
pub fn merge_batch(batch: Vec<AppQuickFix>) -> Option<AppQuickFix> {
    let mut fixes = batch.into_iter();
    let mut merged = fixes.next()?;
    for fix in fixes {
        merged.hqf_infos.extend(fix.hqf_infos);
    }
    Some(merged)
}

/// Check a quick fix against the bundle it patches
pub fn check_with_installed_bundle(
    fix: &AppQuickFix,
    installed: &InstalledBundleRecord,
) -> Result<()> {
    if fix.bundle_name != installed.bundle_name {
        return Err(BmsError::QuickFixBundleNameNotExist {
            bundle: fix.bundle_name.clone(),
        });
    }
    if fix.version_code != installed.version_code {
        return Err(BmsError::QuickFixVersionCodeNotSame {
            installed: installed.version_code,
            candidate: fix.version_code,
        });
    }
    for info in &fix.hqf_infos {
        if !installed.modules.contains_key(&info.module_name) {
            return Err(BmsError::QuickFixModuleNameNotExist {
                module: info.module_name.clone(),
            });
        }
    }

    match fix.quick_fix_type {
        QuickFixType::HotReload => check_hot_reload(fix, installed),
        QuickFixType::Patch => check_patch(fix, installed),
    }
}

fn check_hot_reload(fix: &AppQuickFix, installed: &InstalledBundleRecord) -> Result<()> {
    if !installed.is_debug || installed.provision_type != ProvisionType::Debug {
        return Err(BmsError::HotReloadNotSupportReleaseBundle {
            bundle: installed.bundle_name.clone(),
        });
    }
    if let Some(applied) = &installed.applied_quick_fix {
        if applied.quick_fix_type == QuickFixType::Patch {
            return Err(BmsError::PatchAlreadyExisted {
                bundle: installed.bundle_name.clone(),
            });
        }
        check_patch_version(fix, applied.patch_version_code)?;
    }
    Ok(())
}

fn check_patch(fix: &AppQuickFix, installed: &InstalledBundleRecord) -> Result<()> {
    let hot_reload_applied = installed
        .applied_quick_fix
        .as_ref()
        .is_some_and(|applied| applied.quick_fix_type == QuickFixType::HotReload);
    if hot_reload_applied && installed.is_debug {
        return Err(BmsError::HotReloadAlreadyExisted {
            bundle: installed.bundle_name.clone(),
        });
    }
    if fix.version_name != installed.version_name {
        return Err(BmsError::QuickFixVersionNameNotSame {
            installed: installed.version_name.clone(),
            candidate: fix.version_name.clone(),
        });
    }

    for info in &fix.hqf_infos {
        let abi_differs = !info.cpu_abi.is_empty()
            && !installed.cpu_abi.is_empty()
            && info.cpu_abi != installed.cpu_abi;
        let path_differs = !info.native_library_path.is_empty()
            && !installed.native_library_path.is_empty()
            && info.native_library_path != installed.native_library_path;
        if abi_differs || path_differs {
            return Err(quick_fix::so_incompatible(&info.module_name));
        }
    }

    if let Some(applied) = &installed.applied_quick_fix {
        check_patch_version(fix, applied.patch_version_code)?;
    }
    Ok(())
}

fn check_patch_version(fix: &AppQuickFix, applied: u32) -> Result<()> {
    if fix.patch_version_code <= applied {
        return Err(BmsError::QuickFixVersionCodeError {
            applied,
            candidate: fix.patch_version_code,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{AppliedQuickFix, HqfInfo};
    use crate::test_fixtures::{candidate, installed_record};

    fn fix(bundle: &str, module: &str, version: u32, patch: u32) -> AppQuickFix {
        AppQuickFix {
            bundle_name: bundle.to_string(),
            version_code: version,
            version_name: format!("{version}.0.0"),
            patch_version_code: patch,
            patch_version_name: format!("{version}.0.{patch}"),
            quick_fix_type: QuickFixType::Patch,
            hqf_infos: vec![HqfInfo {
                module_name: module.to_string(),
                hqf_path: PathBuf::from(format!("/hqf/{module}")),
                ..HqfInfo::default()
            }],
        }
    }

    fn applied(kind: QuickFixType, patch: u32) -> AppliedQuickFix {
        AppliedQuickFix {
            quick_fix_type: kind,
            patch_version_code: patch,
            patch_version_name: String::new(),
            modules: vec!["entry".to_string()],
            deploy_dir: PathBuf::from("/data/quickfix/com.x"),
        }
    }

    fn debug_record(version: u32) -> InstalledBundleRecord {
        let mut c = candidate("com.x", "entry", version);
        c.is_debug = true;
        c.provision_type = ProvisionType::Debug;
        installed_record(&c, &[100])
    }

    #[test]
    fn test_batch_must_agree() {
        assert!(check_app_quick_fix_infos(&[]).is_err());

        let batch = vec![fix("com.x", "entry", 2, 1), fix("com.x", "feature", 2, 1)];
        assert!(check_app_quick_fix_infos(&batch).is_ok());

        let batch = vec![fix("com.x", "entry", 2, 1), fix("com.x", "feature", 2, 2)];
        assert_eq!(
            check_app_quick_fix_infos(&batch).unwrap_err(),
            quick_fix::info_not_same("patch version code")
        );

        let mut hot = fix("com.x", "feature", 2, 1);
        hot.quick_fix_type = QuickFixType::HotReload;
        let batch = vec![fix("com.x", "entry", 2, 1), hot];
        assert_eq!(
            check_app_quick_fix_infos(&batch).unwrap_err(),
            quick_fix::info_not_same("quick fix type")
        );

        let batch = vec![fix("com.x", "entry", 2, 1), fix("com.x", "entry", 2, 1)];
        assert!(matches!(
            check_app_quick_fix_infos(&batch),
            Err(BmsError::QuickFixModuleNameDuplicate { .. })
        ));
    }

    #[test]
    fn test_multi_native_so_normalizes_empty_pairs() {
        let mut first = fix("com.x", "entry", 2, 1);
        first.hqf_infos[0].cpu_abi = "arm64-v8a".to_string();
        first.hqf_infos[0].native_library_path = "libs/arm64".to_string();
        let second = fix("com.x", "feature", 2, 1);

        let mut batch = vec![first, second];
        check_multi_native_so(&mut batch).unwrap();
        let normalized = &batch[1].hqf_infos[0];
        assert_eq!(normalized.cpu_abi, "arm64-v8a");
        assert_eq!(normalized.native_library_path, "libs/arm64");
    }

    #[test]
    fn test_multi_native_so_rejects_mismatch() {
        let mut first = fix("com.x", "entry", 2, 1);
        first.hqf_infos[0].cpu_abi = "arm64-v8a".to_string();
        first.hqf_infos[0].native_library_path = "libs/arm64".to_string();
        let mut second = fix("com.x", "feature", 2, 1);
        second.hqf_infos[0].cpu_abi = "arm64-v8a".to_string();
        second.hqf_infos[0].native_library_path = "libs/other".to_string();

        let mut batch = vec![first, second];
        assert!(matches!(
            check_multi_native_so(&mut batch),
            Err(BmsError::SoIncompatible { .. })
        ));
    }

    #[test]
    fn test_multi_native_so_follows_given_order() {
        let mut zeta = fix("com.x", "zeta", 2, 1);
        zeta.hqf_infos[0].cpu_abi = "arm64-v8a".to_string();
        zeta.hqf_infos[0].native_library_path = "libs/arm64".to_string();
        let mut alpha = fix("com.x", "alpha", 2, 1);
        alpha.hqf_infos[0].cpu_abi = "x86_64".to_string();
        alpha.hqf_infos[0].native_library_path = "libs/x86_64".to_string();

        let mut batch = vec![zeta, alpha];
        assert_eq!(
            check_multi_native_so(&mut batch).unwrap_err(),
            quick_fix::so_incompatible("alpha")
        );
    }

    #[test]
    fn test_installed_bundle_identity() {
        let installed = installed_record(&candidate("com.x", "entry", 2), &[100]);

        let err = check_with_installed_bundle(&fix("com.y", "entry", 2, 1), &installed);
        assert!(matches!(
            err,
            Err(BmsError::QuickFixBundleNameNotExist { .. })
        ));

        let err = check_with_installed_bundle(&fix("com.x", "entry", 1, 1), &installed);
        assert!(matches!(
            err,
            Err(BmsError::QuickFixVersionCodeNotSame { .. })
        ));

        let err = check_with_installed_bundle(&fix("com.x", "missing", 2, 1), &installed);
        assert!(matches!(
            err,
            Err(BmsError::QuickFixModuleNameNotExist { .. })
        ));

        assert!(check_with_installed_bundle(&fix("com.x", "entry", 2, 1), &installed).is_ok());
    }

    #[test]
    fn test_patch_native_library_mismatch() {
        let mut c = candidate("com.x", "entry", 2);
        c.native_library_path = "libs/arm64".to_string();
        let installed = installed_record(&c, &[100]);

        let mut patch = fix("com.x", "entry", 2, 1);
        patch.hqf_infos[0].native_library_path = "libs/other".to_string();
        assert!(matches!(
            check_with_installed_bundle(&patch, &installed),
            Err(BmsError::SoIncompatible { .. })
        ));
    }

    #[test]
    fn test_patch_version_name_and_monotonicity() {
        let mut installed = installed_record(&candidate("com.x", "entry", 2), &[100]);

        let mut renamed = fix("com.x", "entry", 2, 1);
        renamed.version_name = "2.0.1".to_string();
        assert!(matches!(
            check_with_installed_bundle(&renamed, &installed),
            Err(BmsError::QuickFixVersionNameNotSame { .. })
        ));

        installed.applied_quick_fix = Some(applied(QuickFixType::Patch, 3));
        assert!(matches!(
            check_with_installed_bundle(&fix("com.x", "entry", 2, 3), &installed),
            Err(BmsError::QuickFixVersionCodeError {
                applied: 3,
                candidate: 3
            })
        ));
        assert!(check_with_installed_bundle(&fix("com.x", "entry", 2, 4), &installed).is_ok());
    }

    #[test]
    fn test_hot_reload_rules() {
        let mut hot = fix("com.x", "entry", 2, 2);
        hot.quick_fix_type = QuickFixType::HotReload;

        let release = installed_record(&candidate("com.x", "entry", 2), &[100]);
        assert!(matches!(
            check_with_installed_bundle(&hot, &release),
            Err(BmsError::HotReloadNotSupportReleaseBundle { .. })
        ));

        let mut debug = debug_record(2);
        assert!(check_with_installed_bundle(&hot, &debug).is_ok());

        debug.applied_quick_fix = Some(applied(QuickFixType::Patch, 1));
        assert!(matches!(
            check_with_installed_bundle(&hot, &debug),
            Err(BmsError::PatchAlreadyExisted { .. })
        ));

        debug.applied_quick_fix = Some(applied(QuickFixType::HotReload, 2));
        assert!(matches!(
            check_with_installed_bundle(&hot, &debug),
            Err(BmsError::QuickFixVersionCodeError { .. })
        ));
    }

    #[test]
    fn test_patch_over_hot_reload_rejected() {
        let mut debug = debug_record(2);
        debug.applied_quick_fix = Some(applied(QuickFixType::HotReload, 1));
        assert!(matches!(
            check_with_installed_bundle(&fix("com.x", "entry", 2, 2), &debug),
            Err(BmsError::HotReloadAlreadyExisted { .. })
        ));
    }

    #[test]
    fn test_merge_batch_collects_modules() {
        let batch = vec![fix("com.x", "entry", 2, 1), fix("com.x", "feature", 2, 1)];
        let merged = merge_batch(batch).unwrap();
        assert_eq!(merged.hqf_infos.len(), 2);
        assert!(merge_batch(Vec::new()).is_none());
    }
}
