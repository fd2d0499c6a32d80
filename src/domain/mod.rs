//! Domain models for the bundle management service
//!
//! This module contains pure domain objects representing core business entities.
//! These types carry no I/O and encode the invariants the checkers rely on.

pub mod bundle;
pub mod identity;
pub mod param;
pub mod quick_fix;
pub mod record;

pub use bundle::{
    BundleType, CandidateBundle, CandidateModule, MAX_OVERLAY_PRIORITY, MIN_OVERLAY_PRIORITY,
    ProvisionType,
};
pub use identity::SigningIdentity;
pub use param::{DEFAULT_USER_ID, InstallParam, SINGLETON_USER_ID, UninstallParam};
pub use quick_fix::{AppQuickFix, AppliedQuickFix, HqfInfo, QuickFixType};
pub use record::{InstalledBundleRecord, InstalledModule, OverlayState, UserInstallState};
