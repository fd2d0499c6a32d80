use clap::Parser;
use std::path::PathBuf;

use bms::domain::{DEFAULT_USER_ID, InstallParam};

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install a bundle from its entry package:\n    bms install ./entry\n\n\
                   Install several modules of one bundle:\n    bms install ./entry ./feature ./skin\n\n\
                   Install for every user:\n    bms install ./entry --all-users\n\n\
                   Roll back to an older version:\n    bms install ./entry --allow-downgrade")]
pub struct InstallArgs {
    /// Unpacked HAP/HSP package directories of one bundle
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<PathBuf>,

    /// User to install for
    #[arg(long, short = 'u', default_value_t = DEFAULT_USER_ID)]
    pub user: i32,

    /// Install for every known user
    #[arg(long, conflicts_with = "user")]
    pub all_users: bool,

    /// Allow installing a lower version code than the installed one
    #[arg(long)]
    pub allow_downgrade: bool,

    /// Mark the bundle as not removable by the user
    #[arg(long)]
    pub not_removable: bool,

    /// Fail when an overlay target cannot be resolved
    #[arg(long)]
    pub require_overlay_target: bool,

    /// Install as a preinstalled system bundle
    #[arg(long)]
    pub system: bool,
}

impl From<&InstallArgs> for InstallParam {
    fn from(args: &InstallArgs) -> Self {
        InstallParam {
            user_id: args.user,
            all_users: args.all_users,
            allow_downgrade: args.allow_downgrade,
            removable: !args.not_removable,
            require_overlay_target: args.require_overlay_target,
            is_system_app: args.system,
        }
    }
}
