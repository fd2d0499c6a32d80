//! Version and app label conflicts

use super::BmsError;

/// Creates a version downgrade error
pub fn downgrade(bundle: impl Into<String>, installed: u32, candidate: u32) -> BmsError {
    BmsError::VersionDowngrade {
        bundle: bundle.into(),
        installed,
        candidate,
    }
}

/// Creates an entry count error
pub fn invalid_entry_count(bundle: impl Into<String>, count: usize) -> BmsError {
    BmsError::InvalidNumberOfEntryHap {
        bundle: bundle.into(),
        count,
    }
}

/// Creates a mismatching bundle name error
pub fn bundle_name_not_same(expected: impl Into<String>, actual: impl Into<String>) -> BmsError {
    BmsError::BundleNameNotSame {
        expected: expected.into(),
        actual: actual.into(),
    }
}
