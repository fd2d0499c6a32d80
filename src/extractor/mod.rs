//! Package extraction into staging directories
//!
//! Real packages are archives; unpacking them is the job of an external
//! service hidden behind [`FileExtractor`]. [`DirectoryExtractor`] handles
//! the unpacked directory layout this crate parses.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, io as io_error};

/// Unpacks one package into a target directory
pub trait FileExtractor: Send + Sync {
    fn extract(&self, hap_path: &Path, target_dir: &Path) -> Result<()>;
}

/// Copies an unpacked package directory tree
#[derive(Debug, Clone, Default)]
pub struct DirectoryExtractor {
    /// Top-level entries that are not copied
    pub exclude: Vec<String>,
}

impl DirectoryExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileExtractor for DirectoryExtractor {
    fn extract(&self, hap_path: &Path, target_dir: &Path) -> Result<()> {
        copy_package(hap_path, target_dir, &self.exclude)
            .map_err(|e| io_error::extraction_failed(hap_path, &e))?;
        debug!(from = %hap_path.display(), to = %target_dir.display(), "package extracted");
        Ok(())
    }
}

fn copy_package(src: &Path, dst: &Path, exclude: &[String]) -> std::io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let file_name = entry.file_name();

        if exclude
            .iter()
            .any(|excluded| file_name.to_str() == Some(excluded.as_str()))
        {
            continue;
        }

        let dst_path = dst.join(&file_name);
        if entry.file_type()?.is_dir() {
            copy_package(&entry_path, &dst_path, &[])?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}
