//! Install command implementation

use std::sync::Arc;

use console::Style;

use bms::config::ServiceConfig;
use bms::domain::InstallParam;
use bms::error::Result;
use bms::receiver::ChannelReceiver;

use super::helpers::{open_manager, wait_for};
use crate::cli::InstallArgs;

/// Run install command
pub fn run(config: &ServiceConfig, verbose: bool, args: InstallArgs) -> Result<()> {
    let manager = open_manager(config)?;
    let param = InstallParam::from(&args);
    let count = args.packages.len();

    let receiver = ChannelReceiver::new();
    manager.submit_install(args.packages, param, Arc::new(receiver.clone()));
    wait_for(&receiver, verbose, "Installing")?;

    println!(
        "{} {} package(s)",
        Style::new().green().bold().apply_to("Installed"),
        count
    );
    Ok(())
}
