//! Quick fix conflicts

use super::BmsError;

/// Creates a batch disagreement error naming the offending field
pub fn info_not_same(field: &str) -> BmsError {
    BmsError::QuickFixInfoNotSame {
        field: field.to_string(),
    }
}

/// Creates a native library incompatibility error
pub fn so_incompatible(module: impl Into<String>) -> BmsError {
    BmsError::SoIncompatible {
        module: module.into(),
    }
}
