//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install command arguments
//! - uninstall: Uninstall command arguments
//! - list: List command arguments
//! - show: Show command arguments
//! - quick_fix: Quick fix command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod install;
pub mod list;
pub mod quick_fix;
pub mod show;
pub mod uninstall;

pub use completions::CompletionsArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use quick_fix::{QuickFixArgs, QuickFixSubcommand};
pub use show::ShowArgs;
pub use uninstall::UninstallArgs;

/// bms - bundle management service
///
/// Install, update and uninstall application bundles transactionally.
#[derive(Parser, Debug)]
#[command(
    name = "bms",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Transactional installer for application bundles",
    long_about = "bms installs, updates and uninstalls application bundles made of HAP/HSP \
                  modules. Every request is checked against the installed bundle (versions, \
                  signatures, overlay and quick fix rules) and either fully applied or fully \
                  rolled back.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  bms install ./entry ./feature           \x1b[90m# Install or update a bundle\x1b[0m\n   \
                  bms install ./entry --all-users         \x1b[90m# Install for every user\x1b[0m\n   \
                  bms uninstall com.example.app -y        \x1b[90m# Uninstall a bundle\x1b[0m\n   \
                  bms list                                \x1b[90m# List installed bundles\x1b[0m\n   \
                  bms show com.example.app                \x1b[90m# Show bundle information\x1b[0m\n   \
                  bms quickfix deploy ./patch             \x1b[90m# Deploy a quick fix\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Data directory holding the registry and installed code
    #[arg(long, short = 'd', global = true, env = "BMS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data-dir>/bms.yaml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install or update a bundle from HAP/HSP packages
    Install(InstallArgs),

    /// Uninstall a bundle or one of its modules
    Uninstall(UninstallArgs),

    /// List installed bundles
    List(ListArgs),

    /// Show bundle information
    Show(ShowArgs),

    /// Deploy or delete quick fixes
    #[command(name = "quickfix")]
    QuickFix(QuickFixArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["bms", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_parsing_show() {
        let cli = Cli::try_parse_from(["bms", "show", "com.example"]).unwrap();
        match cli.command {
            Commands::Show(args) => assert_eq!(args.bundle, "com.example"),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["bms", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["bms", "-v", "-d", "/tmp/bms-data", "list"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/bms-data")));
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::try_parse_from(["bms", "list", "--config", "/etc/bms.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/bms.yaml")));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["bms", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => assert_eq!(args.shell, clap_complete::Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }
}
