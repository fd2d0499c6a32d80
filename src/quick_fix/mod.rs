//! Quick fix deployment
//!
//! Deploys patch and hot reload packages (HQF) against an installed bundle
//! and removes them again. A deployment runs through the same install-state
//! guard and [`Transaction`] as a bundle install, so it never overlaps an
//! install of the same bundle and leaves nothing behind when it fails.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::checker::quick_fix;
use crate::config::DataPaths;
use crate::domain::{AppQuickFix, AppliedQuickFix};
use crate::error::{BmsError, Result, param};
use crate::extractor::FileExtractor;
use crate::installer::{InstallStateGuard, run_reported};
use crate::parser::{self, PATCH_MANIFEST};
use crate::receiver::StatusReceiver;
use crate::registry::{InstallState, Registry};
use crate::signature::SignatureChecker;
use crate::transaction::Transaction;

/// Deploys and deletes quick fixes
pub struct QuickFixDeployer {
    registry: Arc<dyn Registry>,
    signature: Arc<dyn SignatureChecker>,
    extractor: Arc<dyn FileExtractor>,
    paths: DataPaths,
}

impl QuickFixDeployer {
    pub fn new(
        registry: Arc<dyn Registry>,
        signature: Arc<dyn SignatureChecker>,
        extractor: Arc<dyn FileExtractor>,
        paths: DataPaths,
    ) -> Self {
        Self {
            registry,
            signature,
            extractor,
            paths,
        }
    }

    pub fn deploy(&self, hqf_paths: &[PathBuf], receiver: &dyn StatusReceiver) {
        run_reported(receiver, || self.try_deploy(hqf_paths));
    }

    pub fn delete(&self, bundle_name: &str, receiver: &dyn StatusReceiver) {
        run_reported(receiver, || self.try_delete(bundle_name));
    }

    /// Deploy and return the error instead of reporting it
    pub fn try_deploy(&self, hqf_paths: &[PathBuf]) -> Result<()> {
        let hqf_paths = parser::resolve_package_paths(hqf_paths, PATCH_MANIFEST)?;
        let mut batch = parser::parse_hqf_batch(&hqf_paths)?;
        quick_fix::check_app_quick_fix_infos(&batch)?;
        quick_fix::check_multi_native_so(&mut batch)?;
        let fix = quick_fix::merge_batch(batch)
            .ok_or_else(|| param::invalid("quick fix batch is empty"))?;

        let guard = InstallStateGuard::acquire(
            self.registry.as_ref(),
            &fix.bundle_name,
            InstallState::InstallStart,
        )?;

        let mut record = self.registry.get(&fix.bundle_name).ok_or_else(|| {
            BmsError::QuickFixBundleNameNotExist {
                bundle: fix.bundle_name.clone(),
            }
        })?;
        let identity = self.signature.verify(&hqf_paths)?;
        if identity.fingerprint != record.signature_fingerprint {
            return Err(BmsError::FingerprintNotSame {
                bundle: fix.bundle_name.clone(),
            });
        }
        quick_fix::check_with_installed_bundle(&fix, &record)?;

        let mut transaction = Transaction::new(&self.paths.staging_dir())?;
        let staged = transaction.stage_path(&fix.bundle_name);
        for info in &fix.hqf_infos {
            self.extractor
                .extract(&info.hqf_path, &staged.join(&info.module_name))?;
        }

        let deploy_dir = self.paths.quick_fix_dir().join(&fix.bundle_name);
        transaction.replace_dir(&staged, &deploy_dir)?;
        record.applied_quick_fix = Some(applied(&fix, deploy_dir));
        record.update_time = Utc::now();
        self.registry.put(&record)?;

        transaction.commit();
        guard.succeed()?;
        info!(
            bundle = %fix.bundle_name,
            kind = %fix.quick_fix_type,
            patch = fix.patch_version_code,
            "quick fix deployed"
        );
        Ok(())
    }

    /// Delete and return the error instead of reporting it
    pub fn try_delete(&self, bundle_name: &str) -> Result<()> {
        let guard = InstallStateGuard::acquire(
            self.registry.as_ref(),
            bundle_name,
            InstallState::InstallStart,
        )?;

        let mut record = self.registry.get(bundle_name).ok_or_else(|| {
            BmsError::QuickFixBundleNameNotExist {
                bundle: bundle_name.to_string(),
            }
        })?;
        let Some(applied) = record.applied_quick_fix.take() else {
            return Err(BmsError::QuickFixNotDeployed {
                bundle: bundle_name.to_string(),
            });
        };

        let mut transaction = Transaction::new(&self.paths.staging_dir())?;
        transaction.remove_dir(&applied.deploy_dir)?;
        record.update_time = Utc::now();
        self.registry.put(&record)?;

        transaction.commit();
        guard.succeed()?;
        info!(bundle = bundle_name, "quick fix deleted");
        Ok(())
    }
}

fn applied(fix: &AppQuickFix, deploy_dir: PathBuf) -> AppliedQuickFix {
    AppliedQuickFix {
        quick_fix_type: fix.quick_fix_type,
        patch_version_code: fix.patch_version_code,
        patch_version_name: fix.patch_version_name.clone(),
        modules: fix
            .hqf_infos
            .iter()
            .map(|info| info.module_name.clone())
            .collect(),
        deploy_dir,
    }
}
