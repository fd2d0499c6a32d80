//! Error types and handling for the bundle management service
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`param`]: Malformed requests and manifests
//! - [`version`]: Version and app label conflicts with the installed record
//! - [`signature`]: Signing identity conflicts
//! - [`overlay`]: Overlay module and overlay bundle conflicts
//! - [`quick_fix`]: Quick fix (patch / hot reload) conflicts
//! - [`state`]: Concurrent transaction and lifecycle state errors
//! - [`io`]: Staging, extraction and registry I/O failures
//!
//! Every variant maps to a fixed numeric result code (see [`codes`]) which is
//! what a status receiver ultimately sees.

pub mod codes;
pub mod io;
pub mod overlay;
pub mod param;
pub mod quick_fix;
pub mod signature;
pub mod state;
pub mod version;

pub use codes::{ERR_OK, ErrorKind};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for bundle management operations
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum BmsError {
    // Parameter errors
    #[error("Invalid install parameter: {message}")]
    #[diagnostic(code(bms::param::invalid))]
    InvalidParam { message: String },

    #[error("Bundle name is empty in {path}")]
    #[diagnostic(code(bms::param::empty_bundle_name))]
    EmptyBundleName { path: String },

    #[error("Invalid package path: {path}")]
    #[diagnostic(
        code(bms::param::invalid_path),
        help("Package paths must point to an existing HAP/HSP or HQF directory")
    )]
    InvalidFilePath { path: String },

    #[error("Failed to parse manifest {path}: {reason}")]
    #[diagnostic(code(bms::param::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Version conflicts
    #[error("Bundle name '{actual}' does not match '{expected}'")]
    #[diagnostic(code(bms::version::bundle_name_not_same))]
    BundleNameNotSame { expected: String, actual: String },

    #[error("Version downgrade of '{bundle}' from {installed} to {candidate} is not allowed")]
    #[diagnostic(
        code(bms::version::downgrade),
        help("Uninstall the bundle first or install with --allow-downgrade")
    )]
    VersionDowngrade {
        bundle: String,
        installed: u32,
        candidate: u32,
    },

    #[error("Version name '{candidate}' differs from '{installed}' at the same version code")]
    #[diagnostic(code(bms::version::version_name_not_same))]
    VersionNameNotSame { installed: String, candidate: String },

    #[error("Version codes differ between packages of '{bundle}'")]
    #[diagnostic(code(bms::version::version_code_not_same))]
    VersionCodeNotSame { bundle: String },

    #[error("minCompatibleVersionCode {min} is greater than versionCode {version}")]
    #[diagnostic(code(bms::version::invalid_min_compatible))]
    InvalidMinCompatibleVersionCode { min: u32, version: u32 },

    #[error("minCompatibleVersionCode {candidate} differs from installed {installed}")]
    #[diagnostic(code(bms::version::min_compatible_not_same))]
    MinCompatibleVersionCodeNotSame { installed: u32, candidate: u32 },

    #[error("Vendor '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::version::vendor_not_same))]
    VendorNotSame { installed: String, candidate: String },

    #[error("Release type '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::version::release_type_not_same))]
    ReleaseTypeNotSame { installed: String, candidate: String },

    #[error("Singleton flag differs from the installed bundle '{bundle}'")]
    #[diagnostic(code(bms::version::singleton_not_same))]
    SingletonNotSame { bundle: String },

    #[error("Bundle type '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::version::app_type_not_same))]
    AppTypeNotSame { installed: String, candidate: String },

    #[error("Module '{module}' appears more than once in the install batch")]
    #[diagnostic(code(bms::version::module_name_duplicate))]
    ModuleNameDuplicate { module: String },

    #[error("Invalid number of entry modules for '{bundle}': {count}")]
    #[diagnostic(
        code(bms::version::invalid_entry_count),
        help("A bundle must have exactly one entry module")
    )]
    InvalidNumberOfEntryHap { bundle: String, count: usize },

    #[error("CPU ABI '{candidate}' differs from '{expected}'")]
    #[diagnostic(code(bms::version::abi_not_same))]
    AbiNotSame { expected: String, candidate: String },

    // Signature conflicts
    #[error("Signature verification failed for {path}: {reason}")]
    #[diagnostic(code(bms::signature::verification_failed))]
    SignatureVerificationFailed { path: String, reason: String },

    #[error("Packages of '{bundle}' are signed with different certificates")]
    #[diagnostic(code(bms::signature::not_same))]
    SignatureNotSame { bundle: String },

    #[error("Certificate fingerprint of '{bundle}' differs from the installed bundle")]
    #[diagnostic(code(bms::signature::fingerprint_not_same))]
    FingerprintNotSame { bundle: String },

    #[error("App ID '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::signature::app_id_not_same))]
    AppIdNotSame { installed: String, candidate: String },

    #[error("Distribution type '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::signature::distribution_type_not_same))]
    DistributionTypeNotSame { installed: String, candidate: String },

    #[error("Debug/release provision of '{bundle}' differs from the installed bundle")]
    #[diagnostic(code(bms::signature::provision_type_not_same))]
    ProvisionTypeNotSame { bundle: String },

    #[error("Overlay '{bundle}' and target '{target}' are signed with different certificates")]
    #[diagnostic(code(bms::signature::different_certificate))]
    DifferentSignatureCertificate { bundle: String, target: String },

    // Overlay conflicts
    #[error("Overlay module '{module}' cannot be an entry module")]
    #[diagnostic(code(bms::overlay::hap_type))]
    OverlayEntryModule { module: String },

    #[error("Atomic service '{bundle}' cannot contain overlay modules")]
    #[diagnostic(code(bms::overlay::bundle_type))]
    OverlayServiceBundle { bundle: String },

    #[error("Overlay priority {priority} of '{name}' is outside 1..=100")]
    #[diagnostic(code(bms::overlay::invalid_priority))]
    InvalidPriority { name: String, priority: i32 },

    #[error("Overlay module '{module}' targets itself")]
    #[diagnostic(code(bms::overlay::invalid_module_name))]
    InvalidModuleName { module: String },

    #[error("Overlay bundle '{bundle}' targets itself")]
    #[diagnostic(code(bms::overlay::invalid_target_bundle_name))]
    InvalidTargetBundleName { bundle: String },

    #[error("Target module '{target}' of overlay '{module}' is itself an overlay module")]
    #[diagnostic(code(bms::overlay::target_is_overlay))]
    TargetModuleIsOverlay { module: String, target: String },

    #[error("Target bundle '{target}' is itself an overlay bundle")]
    #[diagnostic(code(bms::overlay::target_bundle_is_overlay))]
    TargetBundleIsOverlay { target: String },

    #[error("Target bundle '{target}' is an atomic service")]
    #[diagnostic(code(bms::overlay::target_bundle_is_service))]
    TargetBundleIsService { target: String },

    #[error("Overlay and non-overlay modules of '{bundle}' have inconsistent version codes")]
    #[diagnostic(code(bms::overlay::inconsistent_version_code))]
    InconsistentVersionCode { bundle: String },

    #[error("Target module '{target}' of overlay '{module}' does not exist")]
    #[diagnostic(code(bms::overlay::target_module_not_existed))]
    TargetModuleNotExisted { module: String, target: String },

    #[error("Target bundle '{target}' is not installed")]
    #[diagnostic(code(bms::overlay::target_bundle_not_existed))]
    TargetBundleNotExisted { target: String },

    #[error("Target bundle '{target}' has no module '{module}'")]
    #[diagnostic(code(bms::overlay::missing_overlay_module))]
    MissingOverlayModule { target: String, module: String },

    // Quick fix conflicts
    #[error("Quick fix packages disagree on {field}")]
    #[diagnostic(code(bms::quick_fix::info_not_same))]
    QuickFixInfoNotSame { field: String },

    #[error("Quick fix module '{module}' appears more than once")]
    #[diagnostic(code(bms::quick_fix::module_name_duplicate))]
    QuickFixModuleNameDuplicate { module: String },

    #[error("Quick fix target bundle '{bundle}' is not installed")]
    #[diagnostic(code(bms::quick_fix::bundle_name_not_exist))]
    QuickFixBundleNameNotExist { bundle: String },

    #[error("Quick fix version code {candidate} differs from installed {installed}")]
    #[diagnostic(code(bms::quick_fix::version_code_not_same))]
    QuickFixVersionCodeNotSame { installed: u32, candidate: u32 },

    #[error("Quick fix version name '{candidate}' differs from installed '{installed}'")]
    #[diagnostic(code(bms::quick_fix::version_name_not_same))]
    QuickFixVersionNameNotSame { installed: String, candidate: String },

    #[error("Quick fix module '{module}' is not installed")]
    #[diagnostic(code(bms::quick_fix::module_name_not_exist))]
    QuickFixModuleNameNotExist { module: String },

    #[error("Hot reload is not supported for release bundle '{bundle}'")]
    #[diagnostic(code(bms::quick_fix::hot_reload_release))]
    HotReloadNotSupportReleaseBundle { bundle: String },

    #[error("A patch is already applied to '{bundle}'")]
    #[diagnostic(code(bms::quick_fix::patch_already_existed))]
    PatchAlreadyExisted { bundle: String },

    #[error("A hot reload is already applied to '{bundle}'")]
    #[diagnostic(code(bms::quick_fix::hot_reload_already_existed))]
    HotReloadAlreadyExisted { bundle: String },

    #[error("Patch version code {candidate} must be greater than applied {applied}")]
    #[diagnostic(code(bms::quick_fix::version_code_error))]
    QuickFixVersionCodeError { applied: u32, candidate: u32 },

    #[error("Native library ABI/path of module '{module}' is incompatible")]
    #[diagnostic(code(bms::quick_fix::so_incompatible))]
    SoIncompatible { module: String },

    #[error("No quick fix is deployed for '{bundle}'")]
    #[diagnostic(code(bms::quick_fix::not_deployed))]
    QuickFixNotDeployed { bundle: String },

    // State conflicts
    #[error("Another transaction is in progress for '{bundle}'")]
    #[diagnostic(
        code(bms::state::install_state_error),
        help("Wait for the running install or uninstall to finish")
    )]
    InstallStateError { bundle: String },

    #[error("Bundle '{bundle}' is not installed")]
    #[diagnostic(code(bms::state::bundle_not_installed))]
    BundleNotInstalled { bundle: String },

    #[error("Bundle '{bundle}' is not installed for user {user_id}")]
    #[diagnostic(code(bms::state::not_installed_for_user))]
    NotInstalledForUser { bundle: String, user_id: i32 },

    #[error("Module '{module}' of '{bundle}' is not installed")]
    #[diagnostic(code(bms::state::module_not_installed))]
    ModuleNotInstalled { bundle: String, module: String },

    #[error("User {user_id} does not exist")]
    #[diagnostic(code(bms::state::user_not_exist))]
    UserNotExist { user_id: i32 },

    #[error("Registry {path} is locked by another process")]
    #[diagnostic(
        code(bms::state::registry_locked),
        help("Wait for the other bms process to finish")
    )]
    RegistryLocked { path: String },

    #[error("Bundle '{bundle}' is not removable for user {user_id}")]
    #[diagnostic(code(bms::state::not_removable))]
    BundleNotRemovable { bundle: String, user_id: i32 },

    // I/O failures
    #[error("Failed to extract {path}: {reason}")]
    #[diagnostic(code(bms::io::extraction_failed))]
    ExtractionFailed { path: String, reason: String },

    #[error("Insufficient disk space while writing {path}")]
    #[diagnostic(code(bms::io::insufficient_disk_space))]
    InsufficientDiskSpace { path: String },

    #[error("Failed to create temporary directory under {path}: {reason}")]
    #[diagnostic(code(bms::io::temp_dir_failed))]
    TempDirCreationFailed { path: String, reason: String },

    #[error("Failed to write registry: {reason}")]
    #[diagnostic(code(bms::io::registry_write_failed))]
    RegistryWriteFailed { reason: String },

    #[error("Registry database {path} is corrupted: {reason}")]
    #[diagnostic(code(bms::io::registry_corrupted))]
    RegistryCorrupted { path: String, reason: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(bms::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(bms::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bms::io::error))]
    IoError { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(bms::internal))]
    Internal { message: String },

    /// Outcome of a transaction that ran on an installer worker
    #[error("{message} (code {code})")]
    #[diagnostic(code(bms::transaction_failed))]
    TransactionFailed { code: i32, message: String },
}

impl From<std::io::Error> for BmsError {
    fn from(err: std::io::Error) -> Self {
        BmsError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BmsError {
    fn from(err: serde_yaml::Error) -> Self {
        BmsError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BmsError {
    fn from(err: serde_json::Error) -> Self {
        BmsError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for BmsError {
    fn from(err: inquire::InquireError) -> Self {
        BmsError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BmsError>;

#[cfg(test)]
mod tests;
