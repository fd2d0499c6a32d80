//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Provides ready-made candidates, installed records and on-disk signed
//! packages so checker and installer tests can describe a scenario in a few
//! lines.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{candidate, installed_record, HapBuilder};
//!
//! #[test]
//! fn my_test() {
//!     let installed = installed_record(&candidate("com.example", "entry", 1), &[100]);
//!     let temp = create_temp_dir();
//!     let hap = HapBuilder::new("com.example", "entry", 2).write(temp.path());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use crate::config::DataPaths;
use crate::domain::{
    BundleType, CandidateBundle, CandidateModule, InstallParam, InstalledBundleRecord,
    InstalledModule, ProvisionType, UninstallParam, UserInstallState,
};
use crate::extractor::{DirectoryExtractor, FileExtractor};
use crate::installer::BundleInstaller;
use crate::parser::manifest::{
    AppSection, ModuleManifest, ModuleSection, ModuleType, PatchAppSection, PatchManifest,
    PatchModuleSection,
};
use crate::parser::{MODULE_MANIFEST, PATCH_MANIFEST};
use crate::quick_fix::QuickFixDeployer;
use crate::receiver::{ChannelReceiver, Finished};
use crate::registry::MemoryRegistry;
use crate::signature::{ProvisionChecker, ProvisionProfile};

/// Fingerprint every fixture is signed with unless overridden
pub const FINGERPRINT: &str = "fp-1";

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A stable timestamp for records built in tests
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed time")
}

/// App id derived from a bundle name
#[must_use]
pub fn app_id(bundle: &str) -> String {
    format!("{bundle}_appid")
}

/// A signed single-module candidate with an entry module
#[must_use]
pub fn candidate(bundle: &str, module: &str, version: u32) -> CandidateBundle {
    let module = CandidateModule {
        module_name: module.to_string(),
        is_entry: true,
        hap_path: PathBuf::from(format!("/packages/{bundle}/{module}")),
        ..CandidateModule::default()
    };
    CandidateBundle {
        bundle_name: bundle.to_string(),
        version_code: version,
        version_name: format!("{version}.0.0"),
        min_compatible_version_code: version,
        bundle_type: BundleType::App,
        app_id: app_id(bundle),
        signature_fingerprint: FINGERPRINT.to_string(),
        distribution_type: "os_integration".to_string(),
        provision_type: ProvisionType::Release,
        modules: [(module.module_name.clone(), module)].into_iter().collect(),
        ..CandidateBundle::default()
    }
}

/// A candidate whose only module is a feature module
#[must_use]
pub fn feature_candidate(bundle: &str, module: &str, version: u32) -> CandidateBundle {
    let mut c = candidate(bundle, module, version);
    for m in c.modules.values_mut() {
        m.is_entry = false;
    }
    c
}

/// A candidate whose only module overlays `target` of the same bundle
#[must_use]
pub fn overlay_candidate(
    bundle: &str,
    module: &str,
    target: &str,
    priority: i32,
    version: u32,
) -> CandidateBundle {
    let mut c = feature_candidate(bundle, module, version);
    for m in c.modules.values_mut() {
        m.target_module_name = target.to_string();
        m.target_priority = priority;
    }
    c
}

/// A committed record built from a candidate, installed for `users`
#[must_use]
pub fn installed_record(candidate: &CandidateBundle, users: &[i32]) -> InstalledBundleRecord {
    let mut record = InstalledBundleRecord::from_candidate(candidate, fixed_time());
    for module in candidate.modules.values() {
        let code_path = PathBuf::from(format!(
            "/data/app/{}/{}",
            candidate.bundle_name, module.module_name
        ));
        record.modules.insert(
            module.module_name.clone(),
            InstalledModule::from_candidate(module, candidate.version_code, code_path),
        );
    }
    for user in users {
        record
            .user_states
            .insert(*user, UserInstallState::new(true, fixed_time()));
    }
    record.refresh_overlay_state(&candidate.target_bundle_name);
    record
}

/// Writes a signed HAP package directory
#[derive(Debug, Clone)]
pub struct HapBuilder {
    manifest: ModuleManifest,
    app_id: String,
    fingerprint: String,
    provision_type: ProvisionType,
    files: Vec<(String, String)>,
}

impl HapBuilder {
    /// An entry module of `bundle` at `version`
    #[must_use]
    pub fn new(bundle: &str, module: &str, version: u32) -> Self {
        Self {
            manifest: ModuleManifest {
                app: AppSection {
                    bundle_name: bundle.to_string(),
                    version_code: version,
                    version_name: format!("{version}.0.0"),
                    ..AppSection::default()
                },
                module: ModuleSection {
                    name: module.to_string(),
                    module_type: ModuleType::Entry,
                    ..ModuleSection::default()
                },
            },
            app_id: app_id(bundle),
            fingerprint: FINGERPRINT.to_string(),
            provision_type: ProvisionType::Release,
            files: vec![("resources/index.txt".to_string(), format!("{module}@{version}"))],
        }
    }

    #[must_use]
    pub fn feature(mut self) -> Self {
        self.manifest.module.module_type = ModuleType::Feature;
        self
    }

    /// Turn the module into an overlay of `target` in the same bundle
    #[must_use]
    pub fn overlay(mut self, target: &str, priority: i32) -> Self {
        self.manifest.module.module_type = ModuleType::Feature;
        self.manifest.module.target_module_name = target.to_string();
        self.manifest.module.target_priority = priority;
        self
    }

    #[must_use]
    pub fn fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = fingerprint.to_string();
        self
    }

    #[must_use]
    pub fn debug(mut self) -> Self {
        self.provision_type = ProvisionType::Debug;
        self.manifest.app.debug = true;
        self
    }

    #[must_use]
    pub fn app(mut self, edit: impl FnOnce(&mut AppSection)) -> Self {
        edit(&mut self.manifest.app);
        self
    }

    #[must_use]
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write the package under `dir` and return its path
    ///
    /// # Panics
    ///
    /// Panics if the package cannot be written.
    pub fn write(self, dir: &Path) -> PathBuf {
        let package = dir.join(format!(
            "{}-{}-{}",
            self.manifest.app.bundle_name, self.manifest.module.name, self.manifest.app.version_code
        ));
        std::fs::create_dir_all(&package).expect("Failed to create package directory");
        std::fs::write(
            package.join(MODULE_MANIFEST),
            serde_json::to_string_pretty(&self.manifest).expect("Failed to serialize manifest"),
        )
        .expect("Failed to write manifest");
        write_files(&package, &self.files);
        ProvisionProfile::sign(&package, self.app_id, self.fingerprint, self.provision_type)
            .expect("Failed to sign package")
            .write_to(&package)
            .expect("Failed to write provision profile");
        package
    }
}

/// Writes an HQF package directory
#[derive(Debug, Clone)]
pub struct HqfBuilder {
    manifest: PatchManifest,
    app_id: String,
    fingerprint: String,
    provision_type: ProvisionType,
}

impl HqfBuilder {
    /// A patch for `module` of `bundle` installed at `version`
    #[must_use]
    pub fn new(bundle: &str, module: &str, version: u32, patch_version: u32) -> Self {
        Self {
            manifest: PatchManifest {
                app: PatchAppSection {
                    bundle_name: bundle.to_string(),
                    version_code: version,
                    version_name: format!("{version}.0.0"),
                    patch_version_code: patch_version,
                    patch_version_name: format!("{version}.0.{patch_version}"),
                },
                module: PatchModuleSection {
                    name: module.to_string(),
                    ..PatchModuleSection::default()
                },
            },
            app_id: app_id(bundle),
            fingerprint: FINGERPRINT.to_string(),
            provision_type: ProvisionType::Release,
        }
    }

    /// Hot reloads are signed with a debug provision
    #[must_use]
    pub fn hot_reload(mut self) -> Self {
        self.manifest.module.quick_fix_type = crate::domain::QuickFixType::HotReload;
        self.provision_type = ProvisionType::Debug;
        self
    }

    #[must_use]
    pub fn fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = fingerprint.to_string();
        self
    }

    #[must_use]
    pub fn native(mut self, cpu_abi: &str, native_library_path: &str) -> Self {
        self.manifest.module.cpu_abi = cpu_abi.to_string();
        self.manifest.module.native_library_path = native_library_path.to_string();
        self
    }

    /// Write the package under `dir` and return its path
    ///
    /// # Panics
    ///
    /// Panics if the package cannot be written.
    pub fn write(self, dir: &Path) -> PathBuf {
        let package = dir.join(format!(
            "{}-{}-patch{}",
            self.manifest.app.bundle_name,
            self.manifest.module.name,
            self.manifest.app.patch_version_code
        ));
        std::fs::create_dir_all(&package).expect("Failed to create package directory");
        std::fs::write(
            package.join(PATCH_MANIFEST),
            serde_json::to_string_pretty(&self.manifest).expect("Failed to serialize manifest"),
        )
        .expect("Failed to write manifest");
        write_files(
            &package,
            &[("patch.abc".to_string(), self.manifest.module.name.clone())],
        );
        ProvisionProfile::sign(&package, self.app_id, self.fingerprint, self.provision_type)
            .expect("Failed to sign package")
            .write_to(&package)
            .expect("Failed to write provision profile");
        package
    }
}

/// A data directory, package directory and registry for end-to-end tests
pub struct TestEnv {
    pub temp: TempDir,
    pub registry: Arc<MemoryRegistry>,
    pub paths: DataPaths,
}

impl TestEnv {
    /// Environment knowing users 100 and 101
    #[must_use]
    pub fn new() -> Self {
        let temp = create_temp_dir();
        let paths = DataPaths::new(temp.path().join("data"));
        Self {
            temp,
            registry: Arc::new(MemoryRegistry::new([100, 101])),
            paths,
        }
    }

    /// Directory test packages are written to
    #[must_use]
    pub fn packages(&self) -> PathBuf {
        self.temp.path().join("packages")
    }

    #[must_use]
    pub fn installer(&self) -> BundleInstaller {
        self.installer_with(Arc::new(DirectoryExtractor::new()))
    }

    #[must_use]
    pub fn installer_with(&self, extractor: Arc<dyn FileExtractor>) -> BundleInstaller {
        BundleInstaller::new(
            self.registry.clone(),
            Arc::new(ProvisionChecker::new()),
            extractor,
            self.paths.clone(),
        )
    }

    #[must_use]
    pub fn quick_fix(&self) -> QuickFixDeployer {
        QuickFixDeployer::new(
            self.registry.clone(),
            Arc::new(ProvisionChecker::new()),
            Arc::new(DirectoryExtractor::new()),
            self.paths.clone(),
        )
    }

    /// Run an install and return its single outcome
    pub fn install(&self, haps: &[PathBuf], param: &InstallParam) -> Finished {
        let receiver = ChannelReceiver::new();
        self.installer().install(haps, param, &receiver);
        let finished = receiver.wait();
        assert_eq!(receiver.pending_finished(), 0, "on_finished called twice");
        finished
    }

    pub fn uninstall(&self, bundle: &str, param: &UninstallParam) -> Finished {
        let receiver = ChannelReceiver::new();
        self.installer().uninstall(bundle, param, &receiver);
        receiver.wait()
    }

    pub fn deploy_quick_fix(&self, hqfs: &[PathBuf]) -> Finished {
        let receiver = ChannelReceiver::new();
        self.quick_fix().deploy(hqfs, &receiver);
        receiver.wait()
    }

    /// Staging directories left behind by finished transactions
    #[must_use]
    pub fn staging_leftovers(&self) -> usize {
        std::fs::read_dir(self.paths.staging_dir()).map_or(0, Iterator::count)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_files(base: &Path, files: &[(String, String)]) {
    for (path, content) in files {
        let full_path = base.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::signature::{ProvisionChecker, SignatureChecker};

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_candidate_has_single_entry() {
        let c = candidate("com.example", "entry", 3);
        assert_eq!(c.entry_modules().count(), 1);
        assert_eq!(c.app_id, "com.example_appid");
    }

    #[test]
    fn test_installed_record_has_users() {
        let record = installed_record(&candidate("com.example", "entry", 1), &[100, 101]);
        assert!(record.is_installed_for(100));
        assert!(record.is_installed_for(101));
        assert!(record.modules.contains_key("entry"));
    }

    #[test]
    fn test_hap_builder_writes_signed_package() {
        let temp = create_temp_dir();
        let hap = HapBuilder::new("com.example", "entry", 1).write(temp.path());
        assert!(hap.join(MODULE_MANIFEST).exists());
        let identity = ProvisionChecker::new()
            .verify_hap(&hap)
            .expect("fixture package should verify");
        assert_eq!(identity.fingerprint, FINGERPRINT);
    }
}
