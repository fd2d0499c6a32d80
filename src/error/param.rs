//! Parameter and manifest errors

use super::BmsError;

/// Creates an invalid parameter error
pub fn invalid(message: impl Into<String>) -> BmsError {
    BmsError::InvalidParam {
        message: message.into(),
    }
}

/// Creates an invalid package path error
pub fn invalid_path(path: impl AsRef<std::path::Path>) -> BmsError {
    BmsError::InvalidFilePath {
        path: path.as_ref().display().to_string(),
    }
}

/// Creates a manifest parse error
pub fn manifest_parse_failed(
    path: impl AsRef<std::path::Path>,
    reason: impl ToString,
) -> BmsError {
    BmsError::ManifestParseFailed {
        path: path.as_ref().display().to_string(),
        reason: reason.to_string(),
    }
}
