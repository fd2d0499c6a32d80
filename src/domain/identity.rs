//! Signing identity returned by signature verification

use serde::{Deserialize, Serialize};

use crate::domain::ProvisionType;

/// Provision and signing identity of a verified package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningIdentity {
    pub app_id: String,
    /// Signing certificate fingerprint
    pub fingerprint: String,
    pub provision_type: ProvisionType,
    pub distribution_type: String,
    /// Signed with a debug certificate
    pub is_debug: bool,
}
