use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arguments for the quickfix command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Deploy a patch:\n    bms quickfix deploy ./entry-patch\n\n\
                  Deploy a patch for several modules:\n    bms quickfix deploy ./entry-patch ./feature-patch\n\n\
                  Remove the deployed quick fix:\n    bms quickfix delete com.example.app")]
pub struct QuickFixArgs {
    #[command(subcommand)]
    pub command: QuickFixSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum QuickFixSubcommand {
    /// Deploy a patch or hot reload from HQF packages
    Deploy {
        /// Unpacked HQF package directories
        #[arg(required = true, value_name = "PACKAGE")]
        packages: Vec<PathBuf>,
    },

    /// Delete the quick fix deployed for a bundle
    Delete {
        /// Bundle name
        bundle: String,
    },
}
