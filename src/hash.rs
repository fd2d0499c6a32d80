//! BLAKE3 content digests for package integrity

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{BmsError, Result, signature};

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// File excluded from package digests (it carries the digest itself)
pub const PROVISION_FILE: &str = "provision.json";

fn update_from_file(hasher: &mut Hasher, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| BmsError::IoError {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| BmsError::IoError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }
    Ok(())
}

/// Calculate the BLAKE3 digest of a package directory
///
/// Hashes every file recursively, sorted by relative path for deterministic
/// results. Excludes `provision.json`.
pub fn hash_package(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(BmsError::InvalidFilePath {
            path: path.display().to_string(),
        });
    }

    let mut hasher = Hasher::new();
    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| signature::verification_failed(path, e))?;
        if entry.file_type().is_file() && entry.file_name() != PROVISION_FILE {
            files.push(entry);
        }
    }

    files.sort_by_key(|e| e.path().to_path_buf());

    for entry in files {
        let file_path = entry.path();

        // Include relative path in hash for uniqueness
        let relative_path = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy()
            .replace('\\', "/");
        hasher.update(relative_path.as_bytes());
        hasher.update(b"\0");

        update_from_file(&mut hasher, file_path)?;

        hasher.update(b"\0");
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Verify a digest matches the expected value
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| {
        if h.starts_with(HASH_PREFIX) {
            h.to_string()
        } else {
            format!("{HASH_PREFIX}{h}")
        }
    };

    normalize(expected) == normalize(actual)
}
