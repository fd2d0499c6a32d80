//! Version command implementation

use bms::config::ServiceConfig;
use bms::error::Result;

/// Run version command
pub fn run(config: &ServiceConfig) -> Result<()> {
    println!("bms {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", build_profile());
    println!();
    println!("Service:");
    if let Ok(paths) = config.paths() {
        println!("  Data directory: {}", paths.root().display());
    }
    println!("  Worker threads: {}", config.worker_threads);

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
