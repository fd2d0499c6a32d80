//! Quick fix command implementation

use std::sync::Arc;

use console::Style;

use bms::config::ServiceConfig;
use bms::error::Result;
use bms::receiver::ChannelReceiver;

use super::helpers::{open_manager, wait_for};
use crate::cli::{QuickFixArgs, QuickFixSubcommand};

/// Run quickfix command
pub fn run(config: &ServiceConfig, verbose: bool, args: QuickFixArgs) -> Result<()> {
    let manager = open_manager(config)?;
    let receiver = ChannelReceiver::new();

    match args.command {
        QuickFixSubcommand::Deploy { packages } => {
            manager.submit_quick_fix_deploy(packages, Arc::new(receiver.clone()));
            wait_for(&receiver, verbose, "Deploying quick fix")?;
            println!("{}", Style::new().green().bold().apply_to("Quick fix deployed"));
        }
        QuickFixSubcommand::Delete { bundle } => {
            manager.submit_quick_fix_delete(bundle.clone(), Arc::new(receiver.clone()));
            wait_for(&receiver, verbose, "Deleting quick fix")?;
            println!(
                "{} {}",
                Style::new().green().bold().apply_to("Quick fix deleted for"),
                bundle
            );
        }
    }
    Ok(())
}
