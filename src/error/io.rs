//! Staging, extraction and registry I/O failures

use std::path::Path;

use super::BmsError;

/// Maps an extraction I/O error, recognizing a full disk
pub fn extraction_failed(path: &Path, err: &std::io::Error) -> BmsError {
    if err.kind() == std::io::ErrorKind::StorageFull {
        return BmsError::InsufficientDiskSpace {
            path: path.display().to_string(),
        };
    }
    BmsError::ExtractionFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a temp dir creation failure
pub fn temp_dir_failed(path: &Path, err: &std::io::Error) -> BmsError {
    BmsError::TempDirCreationFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a registry write failure
pub fn registry_write_failed(reason: impl ToString) -> BmsError {
    BmsError::RegistryWriteFailed {
        reason: reason.to_string(),
    }
}
