//! Command helper utilities

use std::sync::Arc;

use bms::config::{DataPaths, ServiceConfig};
use bms::error::Result;
use bms::extractor::DirectoryExtractor;
use bms::installer::{BundleInstaller, InstallerManager};
use bms::quick_fix::QuickFixDeployer;
use bms::receiver::ChannelReceiver;
use bms::registry::{FileRegistry, Registry};
use bms::signature::ProvisionChecker;

use crate::ui;

/// Open the registry database under the configured data directory
pub fn open_registry(config: &ServiceConfig) -> Result<(DataPaths, FileRegistry)> {
    let paths = config.paths()?;
    let registry = FileRegistry::open(paths.registry_file(), config.users.iter().copied())?;
    Ok((paths, registry))
}

/// Build the installer worker pool on top of the registry
pub fn open_manager(config: &ServiceConfig) -> Result<InstallerManager> {
    let (paths, registry) = open_registry(config)?;
    let registry: Arc<dyn Registry> = Arc::new(registry);
    let signature = Arc::new(ProvisionChecker::new());
    let extractor = Arc::new(DirectoryExtractor::new());

    let installer = BundleInstaller::new(
        Arc::clone(&registry),
        signature.clone(),
        extractor.clone(),
        paths.clone(),
    );
    let quick_fix = QuickFixDeployer::new(registry, signature, extractor, paths);
    InstallerManager::new(
        Arc::new(installer),
        Arc::new(quick_fix),
        config.worker_threads,
    )
}

/// Block on a submitted transaction, showing its progress
pub fn wait_for(receiver: &ChannelReceiver, verbose: bool, message: &str) -> Result<()> {
    let mut reporter = ui::reporter(verbose, message);
    let finished = receiver.wait_with(|progress| reporter.set_progress(progress));
    if finished.is_ok() {
        reporter.finish();
    } else {
        reporter.abandon();
    }
    finished.into_result()
}
