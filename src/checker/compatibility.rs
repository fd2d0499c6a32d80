//! Compatibility of a candidate against the installed record and its batch

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::domain::{BundleType, CandidateBundle, InstallParam, InstalledBundleRecord};
use crate::error::{BmsError, Result, param, version};

/// Check one candidate of a batch
///
/// `siblings` are the other candidates of the same install batch. Rules run
/// in a fixed order and the first failure is returned.
pub fn check(
    candidate: &CandidateBundle,
    existing: Option<&InstalledBundleRecord>,
    siblings: &[&CandidateBundle],
    param: &InstallParam,
) -> Result<()> {
    if let Some(existing) = existing {
        check_bundle_name(candidate, existing)?;
        check_version(candidate, existing, param)?;
    }
    check_min_compatible(candidate, existing)?;
    if let Some(existing) = existing {
        check_app_labels(candidate, existing)?;
        check_signing(candidate, existing)?;
    }

    let batch: Vec<&CandidateBundle> = std::iter::once(candidate)
        .chain(
            siblings
                .iter()
                .copied()
                .filter(|s| s.bundle_name == candidate.bundle_name),
        )
        .collect();
    check_siblings(&batch)?;
    check_entry_count(&batch, existing)
}

/// Check every candidate of a batch against the same installed record
///
/// All candidates must belong to one bundle.
pub fn check_batch(
    batch: &BTreeMap<PathBuf, CandidateBundle>,
    existing: Option<&InstalledBundleRecord>,
    param: &InstallParam,
) -> Result<()> {
    let candidates: Vec<&CandidateBundle> = batch.values().collect();
    let Some(first) = candidates.first() else {
        return Err(param::invalid("install batch is empty"));
    };
    if let Some(other) = candidates
        .iter()
        .find(|c| c.bundle_name != first.bundle_name)
    {
        return Err(version::bundle_name_not_same(
            &first.bundle_name,
            &other.bundle_name,
        ));
    }

    for (index, candidate) in candidates.iter().enumerate() {
        let siblings: Vec<&CandidateBundle> = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, c)| *c)
            .collect();
        check(candidate, existing, &siblings, param)?;
    }
    Ok(())
}

fn check_bundle_name(candidate: &CandidateBundle, existing: &InstalledBundleRecord) -> Result<()> {
    if candidate.bundle_name != existing.bundle_name {
        return Err(version::bundle_name_not_same(
            &existing.bundle_name,
            &candidate.bundle_name,
        ));
    }
    Ok(())
}

fn check_version(
    candidate: &CandidateBundle,
    existing: &InstalledBundleRecord,
    param: &InstallParam,
) -> Result<()> {
    if !param.allow_downgrade && candidate.version_code < existing.version_code {
        return Err(version::downgrade(
            &candidate.bundle_name,
            existing.version_code,
            candidate.version_code,
        ));
    }
    if candidate.version_code == existing.version_code
        && candidate.version_name != existing.version_name
    {
        return Err(BmsError::VersionNameNotSame {
            installed: existing.version_name.clone(),
            candidate: candidate.version_name.clone(),
        });
    }
    Ok(())
}

fn check_min_compatible(
    candidate: &CandidateBundle,
    existing: Option<&InstalledBundleRecord>,
) -> Result<()> {
    if candidate.min_compatible_version_code > candidate.version_code {
        return Err(BmsError::InvalidMinCompatibleVersionCode {
            min: candidate.min_compatible_version_code,
            version: candidate.version_code,
        });
    }
    // A new version may move the floor; modules of one version may not disagree
    match existing {
        Some(existing)
            if existing.version_code == candidate.version_code
                && existing.min_compatible_version_code
                    != candidate.min_compatible_version_code =>
        {
            Err(BmsError::MinCompatibleVersionCodeNotSame {
                installed: existing.min_compatible_version_code,
                candidate: candidate.min_compatible_version_code,
            })
        }
        _ => Ok(()),
    }
}

fn check_app_labels(candidate: &CandidateBundle, existing: &InstalledBundleRecord) -> Result<()> {
    if candidate.vendor != existing.vendor {
        return Err(BmsError::VendorNotSame {
            installed: existing.vendor.clone(),
            candidate: candidate.vendor.clone(),
        });
    }
    if candidate.release_type != existing.release_type {
        return Err(BmsError::ReleaseTypeNotSame {
            installed: existing.release_type.clone(),
            candidate: candidate.release_type.clone(),
        });
    }
    if candidate.is_singleton != existing.is_singleton {
        return Err(BmsError::SingletonNotSame {
            bundle: candidate.bundle_name.clone(),
        });
    }
    if candidate.bundle_type != existing.bundle_type {
        return Err(BmsError::AppTypeNotSame {
            installed: existing.bundle_type.to_string(),
            candidate: candidate.bundle_type.to_string(),
        });
    }
    Ok(())
}

fn check_signing(candidate: &CandidateBundle, existing: &InstalledBundleRecord) -> Result<()> {
    if candidate.app_id != existing.app_id {
        return Err(BmsError::AppIdNotSame {
            installed: existing.app_id.clone(),
            candidate: candidate.app_id.clone(),
        });
    }
    if candidate.signature_fingerprint != existing.signature_fingerprint {
        return Err(BmsError::FingerprintNotSame {
            bundle: candidate.bundle_name.clone(),
        });
    }
    if candidate.distribution_type != existing.distribution_type {
        return Err(BmsError::DistributionTypeNotSame {
            installed: existing.distribution_type.clone(),
            candidate: candidate.distribution_type.clone(),
        });
    }
    if candidate.is_debug != existing.is_debug || candidate.provision_type != existing.provision_type
    {
        return Err(BmsError::ProvisionTypeNotSame {
            bundle: candidate.bundle_name.clone(),
        });
    }
    Ok(())
}

fn check_siblings(batch: &[&CandidateBundle]) -> Result<()> {
    let Some(first) = batch.first() else {
        return Ok(());
    };

    let mut module_names = HashSet::new();
    for module in batch.iter().flat_map(|c| c.modules.values()) {
        if !module_names.insert(module.module_name.as_str()) {
            return Err(BmsError::ModuleNameDuplicate {
                module: module.module_name.clone(),
            });
        }
    }

    let entries = batch.iter().flat_map(|c| c.entry_modules()).count();
    if entries > 1 {
        return Err(version::invalid_entry_count(&first.bundle_name, entries));
    }

    let mut abi: Option<&str> = None;
    for candidate in batch {
        if candidate.cpu_abi.is_empty() {
            continue;
        }
        match abi {
            None => abi = Some(&candidate.cpu_abi),
            Some(expected) if expected != candidate.cpu_abi => {
                return Err(BmsError::AbiNotSame {
                    expected: expected.to_string(),
                    candidate: candidate.cpu_abi.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for candidate in &batch[1..] {
        if candidate.signature_fingerprint != first.signature_fingerprint {
            return Err(BmsError::SignatureNotSame {
                bundle: candidate.bundle_name.clone(),
            });
        }
        if candidate.version_code != first.version_code {
            return Err(BmsError::VersionCodeNotSame {
                bundle: candidate.bundle_name.clone(),
            });
        }
    }
    Ok(())
}

fn check_entry_count(
    batch: &[&CandidateBundle],
    existing: Option<&InstalledBundleRecord>,
) -> Result<()> {
    let Some(first) = batch.first() else {
        return Ok(());
    };
    let entries: Vec<&str> = batch
        .iter()
        .flat_map(|c| c.entry_modules())
        .map(|m| m.module_name.as_str())
        .collect();

    match existing {
        None => {
            if entries.len() == 1 || entry_optional(batch) {
                Ok(())
            } else {
                Err(version::invalid_entry_count(
                    &first.bundle_name,
                    entries.len(),
                ))
            }
        }
        Some(existing) => match (existing.entry_module(), entries.first()) {
            (Some(installed), Some(candidate)) if installed.module_name != *candidate => Err(
                version::invalid_entry_count(&first.bundle_name, entries.len() + 1),
            ),
            _ => Ok(()),
        },
    }
}

/// Bundles that may be installed without an entry module
fn entry_optional(batch: &[&CandidateBundle]) -> bool {
    batch.iter().all(|c| {
        c.is_installation_free()
            || c.bundle_type == BundleType::Shared
            || c.is_external_overlay()
            || c.modules.values().all(|m| m.is_overlay())
    })
}
