//! Uninstall command implementation

use std::sync::Arc;

use console::Style;
use inquire::Confirm;

use bms::config::ServiceConfig;
use bms::domain::UninstallParam;
use bms::error::Result;
use bms::receiver::ChannelReceiver;

use super::helpers::{open_manager, wait_for};
use crate::cli::UninstallArgs;

/// Run uninstall command
pub fn run(config: &ServiceConfig, verbose: bool, args: UninstallArgs) -> Result<()> {
    if !args.yes && !confirm_uninstall(&args)? {
        println!("Uninstall cancelled.");
        return Ok(());
    }

    let manager = open_manager(config)?;
    let param = UninstallParam::from(&args);
    let receiver = ChannelReceiver::new();
    manager.submit_uninstall(args.bundle.clone(), param, Arc::new(receiver.clone()));
    wait_for(&receiver, verbose, "Uninstalling")?;

    let target = match &args.module {
        Some(module) => format!("{} ({module})", args.bundle),
        None => args.bundle.clone(),
    };
    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Uninstalled"),
        target
    );
    Ok(())
}

fn confirm_uninstall(args: &UninstallArgs) -> Result<bool> {
    let prompt = match &args.module {
        Some(module) => format!("Uninstall module '{module}' of {}?", args.bundle),
        None => format!("Uninstall {} for user {}?", args.bundle, args.user),
    };
    Ok(Confirm::new(&prompt)
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to cancel")
        .prompt()?)
}
