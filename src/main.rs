//! bms - bundle management service
//!
//! Command line front end for the install/update transaction engine in the
//! `bms` library.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod ui;

use bms::config::ServiceConfig;
use bms::error::Result;
use cli::{Cli, Commands};

/// Log filter: `RUST_LOG` wins, then `-v`, then the configured level
fn init_logging(verbose: bool, config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "bms=debug" } else { config.log_level.as_str() };
        EnvFilter::new(level)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = ServiceConfig::load(cli.config.as_deref(), cli.data_dir.clone())?;
    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Install(args) => commands::install::run(&config, cli.verbose, args),
        Commands::Uninstall(args) => commands::uninstall::run(&config, cli.verbose, args),
        Commands::List(args) => commands::list::run(&config, args),
        Commands::Show(args) => commands::show::run(&config, args),
        Commands::QuickFix(args) => commands::quick_fix::run(&config, cli.verbose, args),
        Commands::Version => commands::version::run(&config),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
