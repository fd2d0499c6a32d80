//! Bundle install, update and uninstall transactions
//!
//! This module handles:
//! - Locking a bundle through the registry's install-state guard
//! - Running the signature, compatibility and overlay checkers
//! - Staging package contents and swapping them into the code directory
//! - Committing the merged record with a single registry write
//! - Reporting exactly one outcome to the caller's [`StatusReceiver`]
//!
//! Any failure before the registry write leaves both the registry and the
//! code directories as they were.

pub mod context;
pub mod lock;
pub mod manager;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::checker::{OverlayChecker, compatibility};
use crate::config::DataPaths;
use crate::domain::{
    CandidateBundle, InstallParam, InstalledBundleRecord, InstalledModule, OverlayState,
    SINGLETON_USER_ID, UninstallParam, UserInstallState,
};
use crate::error::{BmsError, ERR_OK, Result, state};
use crate::extractor::FileExtractor;
use crate::parser::{self, MODULE_MANIFEST};
use crate::receiver::StatusReceiver;
use crate::registry::{InstallState, Registry};
use crate::signature::SignatureChecker;
use crate::transaction::{Transaction, TransactionState};

pub use context::InstallContext;
pub use lock::InstallStateGuard;
pub use manager::InstallerManager;

/// Progress reported once the bundle is locked
const PROGRESS_LOCKED: i32 = 10;
/// Progress reported once every checker passed
const PROGRESS_CHECKED: i32 = 40;
/// Progress reported once every package is staged
const PROGRESS_STAGED: i32 = 70;
/// Progress reported on success
const PROGRESS_DONE: i32 = 100;

/// Run `op` and deliver its outcome to `receiver` exactly once
///
/// A panic inside `op` is reported as an internal error.
pub(crate) fn run_reported(receiver: &dyn StatusReceiver, op: impl FnOnce() -> Result<()>) {
    let outcome = catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "transaction panicked".to_string());
        error!("transaction panicked: {}", message);
        Err(BmsError::Internal { message })
    });

    match outcome {
        Ok(()) => {
            receiver.on_status_notify(PROGRESS_DONE);
            receiver.on_finished(ERR_OK, "");
        }
        Err(e) => {
            info!(code = e.result_code(), "transaction failed: {}", e);
            receiver.on_finished(e.result_code(), &e.to_string());
        }
    }
}

/// Installs, updates and uninstalls bundles
pub struct BundleInstaller {
    registry: Arc<dyn Registry>,
    signature: Arc<dyn SignatureChecker>,
    extractor: Arc<dyn FileExtractor>,
    paths: DataPaths,
}

impl BundleInstaller {
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

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Install or update a bundle from a batch of HAP/HSP packages
    pub fn install(
        &self,
        hap_paths: &[PathBuf],
        param: &InstallParam,
        receiver: &dyn StatusReceiver,
    ) {
        run_reported(receiver, || self.try_install(hap_paths, param, receiver));
    }

    /// Uninstall a bundle, or one of its modules, for a user
    pub fn uninstall(
        &self,
        bundle_name: &str,
        param: &UninstallParam,
        receiver: &dyn StatusReceiver,
    ) {
        run_reported(receiver, || self.try_uninstall(bundle_name, param));
    }

    /// Install and return the error instead of reporting it
    pub fn try_install(
        &self,
        hap_paths: &[PathBuf],
        param: &InstallParam,
        receiver: &dyn StatusReceiver,
    ) -> Result<()> {
        let hap_paths = parser::resolve_package_paths(hap_paths, MODULE_MANIFEST)?;
        let mut ctx = InstallContext::new(parser::parse_batch(&hap_paths)?)?;

        let guard = InstallStateGuard::acquire(
            self.registry.as_ref(),
            &ctx.bundle_name,
            InstallState::InstallStart,
        )?;
        receiver.on_status_notify(PROGRESS_LOCKED);

        ctx.advance(TransactionState::Checking);
        let users = match self.check(&mut ctx, &hap_paths, param) {
            Ok(users) => users,
            Err(e) => {
                ctx.advance(TransactionState::RolledBack);
                return Err(e);
            }
        };
        receiver.on_status_notify(PROGRESS_CHECKED);

        ctx.advance(TransactionState::Staging);
        let mut transaction = Transaction::new(&self.paths.staging_dir())?;
        if let Err(e) = self.stage(&ctx, &transaction) {
            ctx.advance(TransactionState::RolledBack);
            return Err(e);
        }
        receiver.on_status_notify(PROGRESS_STAGED);

        ctx.advance(TransactionState::Committing);
        if let Err(e) = self.commit(&ctx, &mut transaction, &users, param) {
            ctx.advance(TransactionState::RolledBack);
            return Err(e);
        }
        transaction.commit();
        guard.succeed()?;
        ctx.advance(TransactionState::Done);

        info!(bundle = %ctx.bundle_name, update = ctx.is_update(), "bundle installed");
        Ok(())
    }

    /// Checking phase; returns the users the bundle is installed for
    fn check(
        &self,
        ctx: &mut InstallContext,
        hap_paths: &[PathBuf],
        param: &InstallParam,
    ) -> Result<Vec<i32>> {
        let identity = self.signature.verify(hap_paths)?;
        for candidate in ctx.candidates.values_mut() {
            candidate.apply_identity(&identity)?;
        }

        ctx.existing = self.registry.get(&ctx.bundle_name);
        compatibility::check_batch(&ctx.candidates, ctx.existing.as_ref(), param)?;

        if OverlayChecker::is_needed(&ctx.candidates) {
            OverlayChecker::new(self.registry.as_ref()).check(
                &ctx.candidates,
                ctx.existing.as_ref(),
                param,
            )?;
        }

        let primary = ctx
            .primary()
            .ok_or_else(|| crate::error::param::invalid("install batch is empty"))?;
        self.target_users(primary, param)
    }

    fn target_users(&self, candidate: &CandidateBundle, param: &InstallParam) -> Result<Vec<i32>> {
        if candidate.is_singleton {
            return Ok(vec![SINGLETON_USER_ID]);
        }
        let known = self.registry.get_all_users();
        if param.all_users {
            return Ok(known);
        }
        if !known.contains(&param.user_id) {
            return Err(BmsError::UserNotExist {
                user_id: param.user_id,
            });
        }
        Ok(vec![param.user_id])
    }

    fn stage(&self, ctx: &InstallContext, transaction: &Transaction) -> Result<()> {
        for module in ctx.candidates.values().flat_map(|c| c.modules.values()) {
            let staged = transaction.stage_path(&module.module_name);
            self.extractor.extract(&module.hap_path, &staged)?;
            debug!(module = %module.module_name, staged = %staged.display(), "module staged");
        }
        Ok(())
    }

    fn commit(
        &self,
        ctx: &InstallContext,
        transaction: &mut Transaction,
        users: &[i32],
        param: &InstallParam,
    ) -> Result<()> {
        let primary = ctx
            .primary()
            .ok_or_else(|| crate::error::param::invalid("install batch is empty"))?;
        let now = Utc::now();

        let mut record = match &ctx.existing {
            Some(existing) => {
                let mut record = existing.clone();
                record.apply_candidate_fields(primary);
                record.update_time = now;
                record
            }
            None => InstalledBundleRecord::from_candidate(primary, now),
        };
        record.is_system_app |= param.is_system_app;

        // A quick fix targets one version; a new version drops it
        let version_changed = ctx
            .existing
            .as_ref()
            .is_some_and(|e| e.version_code != record.version_code);
        if version_changed {
            if let Some(applied) = record.applied_quick_fix.take() {
                transaction.remove_dir(&applied.deploy_dir)?;
            }
            self.drop_stale_modules(ctx, &mut record, transaction)?;
        }

        for module in ctx.candidates.values().flat_map(|c| c.modules.values()) {
            let code_path = self
                .paths
                .module_dir(&ctx.bundle_name, &module.module_name);
            let staged = transaction.stage_path(&module.module_name);
            transaction.replace_dir(&staged, &code_path)?;
            record.modules.insert(
                module.module_name.clone(),
                InstalledModule::from_candidate(module, primary.version_code, code_path),
            );
        }
        record.refresh_overlay_state(&primary.target_bundle_name);

        for user in users {
            record
                .user_states
                .entry(*user)
                .and_modify(|state| state.update_time = now)
                .or_insert_with(|| UserInstallState::new(param.removable, now));
        }

        self.registry.put(&record)
    }

    /// Remove installed modules left at an older version by an upgrade
    ///
    /// Every module of a bundle runs at the bundle's version code, so a module
    /// missing from the batch cannot be kept once the version changes.
    fn drop_stale_modules(
        &self,
        ctx: &InstallContext,
        record: &mut InstalledBundleRecord,
        transaction: &mut Transaction,
    ) -> Result<()> {
        let stale: Vec<String> = record
            .modules
            .values()
            .filter(|m| m.version_code != record.version_code)
            .filter(|m| !ctx.candidates.values().any(|c| c.modules.contains_key(&m.module_name)))
            .map(|m| m.module_name.clone())
            .collect();

        for name in stale {
            if let Some(module) = record.modules.remove(&name) {
                transaction.remove_dir(&module.code_path)?;
                debug!(bundle = %ctx.bundle_name, module = %name, "stale module removed");
            }
        }
        Ok(())
    }

    /// Uninstall and return the error instead of reporting it
    pub fn try_uninstall(&self, bundle_name: &str, param: &UninstallParam) -> Result<()> {
        let guard = InstallStateGuard::acquire(
            self.registry.as_ref(),
            bundle_name,
            InstallState::UninstallStart,
        )?;

        let mut record = self
            .registry
            .get(bundle_name)
            .ok_or_else(|| state::not_installed(bundle_name))?;
        let user_id = if record.is_singleton {
            SINGLETON_USER_ID
        } else {
            param.user_id
        };
        let Some(user_state) = record.user_states.get(&user_id) else {
            return Err(BmsError::NotInstalledForUser {
                bundle: bundle_name.to_string(),
                user_id,
            });
        };
        if !user_state.removable {
            return Err(BmsError::BundleNotRemovable {
                bundle: bundle_name.to_string(),
                user_id,
            });
        }

        let mut transaction = Transaction::new(&self.paths.staging_dir())?;
        let removes_module = match &param.module_name {
            Some(module) => {
                if !record.modules.contains_key(module) {
                    return Err(BmsError::ModuleNotInstalled {
                        bundle: bundle_name.to_string(),
                        module: module.clone(),
                    });
                }
                record.modules.len() > 1
            }
            None => false,
        };

        if let (true, Some(module_name)) = (removes_module, &param.module_name) {
            if let Some(module) = record.modules.remove(module_name) {
                transaction.remove_dir(&module.code_path)?;
            }
            let target = match &record.overlay_state {
                OverlayState::External { target_bundle_name } => target_bundle_name.clone(),
                _ => String::new(),
            };
            record.refresh_overlay_state(&target);
            record.update_time = Utc::now();
            self.registry.put(&record)?;
            info!(bundle = bundle_name, module = %module_name, "module uninstalled");
        } else {
            record.user_states.remove(&user_id);
            if record.user_states.is_empty() {
                transaction.remove_dir(&record.bundle_code_dir(&self.paths.app_dir()))?;
                if let Some(applied) = &record.applied_quick_fix {
                    transaction.remove_dir(&applied.deploy_dir)?;
                }
                self.registry.remove(bundle_name)?;
                info!(bundle = bundle_name, "bundle uninstalled");
            } else {
                record.update_time = Utc::now();
                self.registry.put(&record)?;
                info!(bundle = bundle_name, user_id, "bundle uninstalled for user");
            }
        }

        transaction.commit();
        guard.succeed()
    }
}
