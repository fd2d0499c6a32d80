//! Package signature verification
//!
//! The transaction engine only consumes a [`SigningIdentity`]; how a package
//! proves it is abstracted behind [`SignatureChecker`]. The bundled
//! [`ProvisionChecker`] reads a provision profile shipped inside the package
//! and checks its BLAKE3 digest against the package contents.

mod provision;

use std::path::{Path, PathBuf};

use crate::domain::SigningIdentity;
use crate::error::{BmsError, Result};

pub use provision::{ProvisionChecker, ProvisionProfile};

/// Verifies package signature blocks
pub trait SignatureChecker: Send + Sync {
    /// Verify one package and return its signing identity
    fn verify_hap(&self, hap_path: &Path) -> Result<SigningIdentity>;

    /// Verify a set of packages that must share one signing identity
    fn verify(&self, hap_paths: &[PathBuf]) -> Result<SigningIdentity> {
        let mut identity: Option<SigningIdentity> = None;
        for path in hap_paths {
            let current = self.verify_hap(path)?;
            match &identity {
                None => identity = Some(current),
                Some(first)
                    if first.fingerprint != current.fingerprint
                        || first.app_id != current.app_id =>
                {
                    return Err(BmsError::SignatureNotSame {
                        bundle: current.app_id,
                    });
                }
                Some(_) => {}
            }
        }
        identity.ok_or_else(|| crate::error::param::invalid("no packages to verify"))
    }
}
