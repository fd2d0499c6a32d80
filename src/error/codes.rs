//! Numeric result codes surfaced to status receivers
//!
//! Codes are grouped in ranges by [`ErrorKind`] and never reused.

use super::BmsError;

/// Result code reported for a successful transaction
pub const ERR_OK: i32 = 0;

/// Coarse error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParamError,
    VersionConflict,
    SignatureConflict,
    OverlayConflict,
    QuickFixConflict,
    StateConflict,
    IoFailure,
    Internal,
}

impl BmsError {
    /// Fixed numeric code for this error, `1..` (0 is [`ERR_OK`])
    #[allow(clippy::match_same_arms)]
    pub fn result_code(&self) -> i32 {
        match self {
            BmsError::InvalidParam { .. } => 1,
            BmsError::EmptyBundleName { .. } => 2,
            BmsError::InvalidFilePath { .. } => 3,
            BmsError::ManifestParseFailed { .. } => 4,

            BmsError::BundleNameNotSame { .. } => 10,
            BmsError::VersionDowngrade { .. } => 11,
            BmsError::VersionNameNotSame { .. } => 12,
            BmsError::VersionCodeNotSame { .. } => 13,
            BmsError::InvalidMinCompatibleVersionCode { .. } => 14,
            BmsError::MinCompatibleVersionCodeNotSame { .. } => 15,
            BmsError::VendorNotSame { .. } => 16,
            BmsError::ReleaseTypeNotSame { .. } => 17,
            BmsError::SingletonNotSame { .. } => 18,
            BmsError::AppTypeNotSame { .. } => 19,
            BmsError::ModuleNameDuplicate { .. } => 20,
            BmsError::InvalidNumberOfEntryHap { .. } => 21,
            BmsError::AbiNotSame { .. } => 22,

            BmsError::SignatureVerificationFailed { .. } => 30,
            BmsError::SignatureNotSame { .. } => 31,
            BmsError::FingerprintNotSame { .. } => 32,
            BmsError::AppIdNotSame { .. } => 33,
            BmsError::DistributionTypeNotSame { .. } => 34,
            BmsError::ProvisionTypeNotSame { .. } => 35,
            BmsError::DifferentSignatureCertificate { .. } => 36,

            BmsError::OverlayEntryModule { .. } => 40,
            BmsError::OverlayServiceBundle { .. } => 41,
            BmsError::InvalidPriority { .. } => 42,
            BmsError::InvalidModuleName { .. } => 43,
            BmsError::InvalidTargetBundleName { .. } => 44,
            BmsError::TargetModuleIsOverlay { .. } => 45,
            BmsError::TargetBundleIsOverlay { .. } => 46,
            BmsError::TargetBundleIsService { .. } => 47,
            BmsError::InconsistentVersionCode { .. } => 48,
            BmsError::TargetModuleNotExisted { .. } => 49,
            BmsError::TargetBundleNotExisted { .. } => 50,
            BmsError::MissingOverlayModule { .. } => 51,

            BmsError::QuickFixInfoNotSame { .. } => 60,
            BmsError::QuickFixModuleNameDuplicate { .. } => 61,
            BmsError::QuickFixBundleNameNotExist { .. } => 62,
            BmsError::QuickFixVersionCodeNotSame { .. } => 63,
            BmsError::QuickFixVersionNameNotSame { .. } => 64,
            BmsError::QuickFixModuleNameNotExist { .. } => 65,
            BmsError::HotReloadNotSupportReleaseBundle { .. } => 66,
            BmsError::PatchAlreadyExisted { .. } => 67,
            BmsError::HotReloadAlreadyExisted { .. } => 68,
            BmsError::QuickFixVersionCodeError { .. } => 69,
            BmsError::SoIncompatible { .. } => 70,
            BmsError::QuickFixNotDeployed { .. } => 71,

            BmsError::InstallStateError { .. } => 80,
            BmsError::BundleNotInstalled { .. } => 81,
            BmsError::NotInstalledForUser { .. } => 82,
            BmsError::ModuleNotInstalled { .. } => 83,
            BmsError::UserNotExist { .. } => 84,
            BmsError::RegistryLocked { .. } => 85,
            BmsError::BundleNotRemovable { .. } => 86,

            BmsError::ExtractionFailed { .. } => 90,
            BmsError::InsufficientDiskSpace { .. } => 91,
            BmsError::TempDirCreationFailed { .. } => 92,
            BmsError::RegistryWriteFailed { .. } => 93,
            BmsError::RegistryCorrupted { .. } => 94,
            BmsError::ConfigReadFailed { .. } => 95,
            BmsError::ConfigParseFailed { .. } => 96,
            BmsError::IoError { .. } => 97,

            BmsError::Internal { .. } => 100,

            BmsError::TransactionFailed { code, .. } => *code,
        }
    }

    /// Taxonomy group of this error
    pub fn kind(&self) -> ErrorKind {
        match self.result_code() {
            1..=9 => ErrorKind::ParamError,
            10..=29 => ErrorKind::VersionConflict,
            30..=39 => ErrorKind::SignatureConflict,
            40..=59 => ErrorKind::OverlayConflict,
            60..=79 => ErrorKind::QuickFixConflict,
            80..=89 => ErrorKind::StateConflict,
            90..=99 => ErrorKind::IoFailure,
            _ => ErrorKind::Internal,
        }
    }
}
