use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all installed bundles:\n    bms list\n\n\
                  List bundles of one user:\n    bms list --user 101\n\n\
                  Show modules too:\n    bms list --detailed")]
pub struct ListArgs {
    /// Only bundles installed for this user
    #[arg(long, short = 'u')]
    pub user: Option<i32>,

    /// Show detailed output
    #[arg(long)]
    pub detailed: bool,
}
