//! Show command implementation

use bms::config::ServiceConfig;
use bms::error::{Result, state};
use bms::registry::Registry;

use super::helpers::open_registry;
use crate::cli::ShowArgs;
use crate::ui::display::display_bundle_detailed;

/// Run show command
pub fn run(config: &ServiceConfig, args: ShowArgs) -> Result<()> {
    let (_, registry) = open_registry(config)?;
    let record = registry
        .get(&args.bundle)
        .ok_or_else(|| state::not_installed(&args.bundle))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        display_bundle_detailed(&record);
    }
    Ok(())
}
