//! Common test utilities for bms integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

use bms::domain::{ProvisionType, QuickFixType};
use bms::parser::manifest::{
    AppSection, ModuleManifest, ModuleSection, ModuleType, PatchAppSection, PatchManifest,
    PatchModuleSection,
};
use bms::parser::{MODULE_MANIFEST, PATCH_MANIFEST};
use bms::signature::ProvisionProfile;

/// Fingerprint packages are signed with unless a test overrides it
#[allow(dead_code)]
pub const FINGERPRINT: &str = "fp-integration";

/// A data directory plus a package directory for CLI tests
pub struct TestService {
    /// Temporary directory
    pub temp: TempDir,
    /// Data directory handed to `--data-dir`
    pub data_dir: PathBuf,
    /// Where test packages are written
    pub packages: PathBuf,
}

impl TestService {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp.path().join("data");
        let packages = temp.path().join("packages");
        std::fs::create_dir_all(&packages).expect("Failed to create packages directory");
        Self {
            temp,
            data_dir,
            packages,
        }
    }

    /// `bms` bound to this service's data directory
    pub fn cmd(&self) -> Command {
        let mut cmd = bms_cmd();
        cmd.env_remove("BMS_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(&self.data_dir);
        cmd
    }

    /// Write a users/worker configuration into the data directory
    #[allow(dead_code)]
    pub fn write_config(&self, yaml: &str) {
        std::fs::create_dir_all(&self.data_dir).expect("Failed to create data directory");
        std::fs::write(self.data_dir.join("bms.yaml"), yaml).expect("Failed to write config");
    }

    /// Installed code directory of a module
    #[allow(dead_code)]
    pub fn module_dir(&self, bundle: &str, module: &str) -> PathBuf {
        self.data_dir.join("app").join(bundle).join(module)
    }

    #[allow(dead_code)]
    pub fn registry_json(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.data_dir.join("registry.json"))
            .expect("Failed to read registry");
        serde_json::from_str(&content).expect("Registry is not valid JSON")
    }
}

impl Default for TestService {
    fn default() -> Self {
        Self::new()
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn bms_cmd() -> Command {
    Command::cargo_bin("bms").expect("bms binary is built")
}

/// Builds a signed HAP package directory
#[allow(dead_code)]
pub struct Hap {
    manifest: ModuleManifest,
    fingerprint: String,
}

#[allow(dead_code)]
impl Hap {
    /// Entry module `module` of `bundle` at `version`
    pub fn entry(bundle: &str, module: &str, version: u32) -> Self {
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
            fingerprint: FINGERPRINT.to_string(),
        }
    }

    pub fn feature(bundle: &str, module: &str, version: u32) -> Self {
        let mut hap = Self::entry(bundle, module, version);
        hap.manifest.module.module_type = ModuleType::Feature;
        hap
    }

    pub fn overlay(bundle: &str, module: &str, target: &str, priority: i32, version: u32) -> Self {
        let mut hap = Self::feature(bundle, module, version);
        hap.manifest.module.target_module_name = target.to_string();
        hap.manifest.module.target_priority = priority;
        hap
    }

    pub fn version_name(mut self, name: &str) -> Self {
        self.manifest.app.version_name = name.to_string();
        self
    }

    pub fn native_library_path(mut self, abi: &str, path: &str) -> Self {
        self.manifest.app.cpu_abi = abi.to_string();
        self.manifest.app.native_library_path = path.to_string();
        self
    }

    pub fn fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = fingerprint.to_string();
        self
    }

    /// Write under `dir/<name>` and return the package path
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let package = dir.join(name);
        std::fs::create_dir_all(package.join("resources"))
            .expect("Failed to create package directory");
        std::fs::write(
            package.join(MODULE_MANIFEST),
            serde_json::to_string_pretty(&self.manifest).expect("Failed to serialize manifest"),
        )
        .expect("Failed to write manifest");
        std::fs::write(
            package.join("resources").join("index.txt"),
            format!(
                "{}@{}",
                self.manifest.module.name, self.manifest.app.version_code
            ),
        )
        .expect("Failed to write resource");
        sign(
            &package,
            &self.manifest.app.bundle_name,
            &self.fingerprint,
            ProvisionType::Release,
        );
        package
    }
}

/// Write a signed patch package for `module` of `bundle` at `version`
#[allow(dead_code)]
pub fn write_patch(
    dir: &Path,
    name: &str,
    bundle: &str,
    module: &str,
    version: u32,
    patch_version: u32,
    native: Option<(&str, &str)>,
) -> PathBuf {
    let (cpu_abi, native_library_path) = native.unwrap_or_default();
    let manifest = PatchManifest {
        app: PatchAppSection {
            bundle_name: bundle.to_string(),
            version_code: version,
            version_name: format!("{version}.0.0"),
            patch_version_code: patch_version,
            patch_version_name: format!("{version}.0.{patch_version}"),
        },
        module: PatchModuleSection {
            name: module.to_string(),
            quick_fix_type: QuickFixType::Patch,
            cpu_abi: cpu_abi.to_string(),
            native_library_path: native_library_path.to_string(),
        },
    };

    let package = dir.join(name);
    std::fs::create_dir_all(&package).expect("Failed to create package directory");
    std::fs::write(
        package.join(PATCH_MANIFEST),
        serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest"),
    )
    .expect("Failed to write manifest");
    std::fs::write(package.join("patch.abc"), module).expect("Failed to write patch");
    sign(&package, bundle, FINGERPRINT, ProvisionType::Release);
    package
}

fn sign(package: &Path, bundle: &str, fingerprint: &str, provision_type: ProvisionType) {
    ProvisionProfile::sign(package, format!("{bundle}_id"), fingerprint, provision_type)
        .expect("Failed to sign package")
        .write_to(package)
        .expect("Failed to write provision profile");
}
