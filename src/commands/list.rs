//! List command implementation
//!
//! Lists installed bundles from the registry, optionally for one user.

use bms::config::ServiceConfig;
use bms::error::Result;
use bms::registry::Registry;

use super::helpers::open_registry;
use crate::cli::ListArgs;
use crate::ui::display::{display_bundle_detailed, display_bundle_simple};

/// Run list command
pub fn run(config: &ServiceConfig, args: ListArgs) -> Result<()> {
    let (_, registry) = open_registry(config)?;
    let bundles: Vec<_> = registry
        .enumerate()
        .into_iter()
        .filter(|record| args.user.is_none_or(|user| record.is_installed_for(user)))
        .collect();

    if bundles.is_empty() {
        println!("No bundles installed.");
        return Ok(());
    }

    println!("Installed bundles ({}):", bundles.len());
    println!();
    for record in &bundles {
        if args.detailed {
            display_bundle_detailed(record);
        } else {
            display_bundle_simple(record);
        }
        println!();
    }
    Ok(())
}
