//! Signature and provision conflicts

use super::BmsError;

/// Creates a signature verification failure
pub fn verification_failed(path: impl AsRef<std::path::Path>, reason: impl ToString) -> BmsError {
    BmsError::SignatureVerificationFailed {
        path: path.as_ref().display().to_string(),
        reason: reason.to_string(),
    }
}
