//! Provision-profile based signature checker

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SignatureChecker;
use crate::domain::{ProvisionType, SigningIdentity};
use crate::error::{Result, signature};
use crate::hash::{self, PROVISION_FILE};

/// Contents of `provision.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionProfile {
    pub app_id: String,
    pub fingerprint: String,
    #[serde(default)]
    pub provision_type: ProvisionType,
    #[serde(default)]
    pub distribution_type: String,
    /// BLAKE3 digest of the package contents, excluding this file
    pub digest: String,
}

impl ProvisionProfile {
    /// Build a profile for `package_dir` with a freshly computed digest
    pub fn sign(
        package_dir: &Path,
        app_id: impl Into<String>,
        fingerprint: impl Into<String>,
        provision_type: ProvisionType,
    ) -> Result<Self> {
        Ok(Self {
            app_id: app_id.into(),
            fingerprint: fingerprint.into(),
            provision_type,
            distribution_type: "os_integration".to_string(),
            digest: hash::hash_package(package_dir)?,
        })
    }

    /// Write the profile into `package_dir`
    pub fn write_to(&self, package_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(package_dir.join(PROVISION_FILE), content)?;
        Ok(())
    }
}

/// Verifies packages against their bundled provision profile
#[derive(Debug, Clone, Default)]
pub struct ProvisionChecker;

impl ProvisionChecker {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureChecker for ProvisionChecker {
    fn verify_hap(&self, hap_path: &Path) -> Result<SigningIdentity> {
        let profile_path = hap_path.join(PROVISION_FILE);
        let content = fs::read_to_string(&profile_path)
            .map_err(|e| signature::verification_failed(hap_path, e))?;
        let profile: ProvisionProfile = serde_json::from_str(&content)
            .map_err(|e| signature::verification_failed(hap_path, e))?;

        if profile.app_id.is_empty() || profile.fingerprint.is_empty() {
            return Err(signature::verification_failed(
                hap_path,
                "provision profile has no app id or fingerprint",
            ));
        }

        let actual = hash::hash_package(hap_path)?;
        if !hash::verify_hash(&profile.digest, &actual) {
            return Err(signature::verification_failed(
                hap_path,
                "package digest does not match provision profile",
            ));
        }

        debug!(path = %hap_path.display(), app_id = %profile.app_id, "package signature verified");
        Ok(SigningIdentity {
            is_debug: profile.provision_type == ProvisionType::Debug,
            app_id: profile.app_id,
            fingerprint: profile.fingerprint,
            provision_type: profile.provision_type,
            distribution_type: profile.distribution_type,
        })
    }
}
