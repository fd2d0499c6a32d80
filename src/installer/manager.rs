//! Worker pool that runs install requests off the caller's thread

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use tracing::{debug, error};

use super::BundleInstaller;
use crate::domain::{InstallParam, UninstallParam};
use crate::error::{BmsError, Result};
use crate::quick_fix::QuickFixDeployer;
use crate::receiver::StatusReceiver;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed pool of installer threads
///
/// Requests for different bundles run in parallel; requests for the same
/// bundle are serialized by the registry's install-state guard, so a second
/// concurrent request fails fast instead of queueing.
pub struct InstallerManager {
    installer: Arc<BundleInstaller>,
    quick_fix: Arc<QuickFixDeployer>,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl InstallerManager {
    pub fn new(
        installer: Arc<BundleInstaller>,
        quick_fix: Arc<QuickFixDeployer>,
        threads: usize,
    ) -> Result<Self> {
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..threads.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("bms-installer-{index}"))
                    .spawn(move || {
                        for job in receiver.iter() {
                            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                                error!("installer job panicked");
                            }
                        }
                        debug!("installer worker stopped");
                    })
                    .map_err(|e| BmsError::Internal {
                        message: format!("Failed to spawn installer worker: {e}"),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(threads = workers.len(), "installer manager started");
        Ok(Self {
            installer,
            quick_fix,
            sender: Some(sender),
            workers,
        })
    }

    pub fn installer(&self) -> &Arc<BundleInstaller> {
        &self.installer
    }

    pub fn submit_install(
        &self,
        hap_paths: Vec<PathBuf>,
        param: InstallParam,
        receiver: Arc<dyn StatusReceiver>,
    ) {
        let installer = Arc::clone(&self.installer);
        let job_receiver = Arc::clone(&receiver);
        self.submit(receiver, move || {
            installer.install(&hap_paths, &param, job_receiver.as_ref());
        });
    }

    pub fn submit_uninstall(
        &self,
        bundle_name: String,
        param: UninstallParam,
        receiver: Arc<dyn StatusReceiver>,
    ) {
        let installer = Arc::clone(&self.installer);
        let job_receiver = Arc::clone(&receiver);
        self.submit(receiver, move || {
            installer.uninstall(&bundle_name, &param, job_receiver.as_ref());
        });
    }

    pub fn submit_quick_fix_deploy(
        &self,
        hqf_paths: Vec<PathBuf>,
        receiver: Arc<dyn StatusReceiver>,
    ) {
        let deployer = Arc::clone(&self.quick_fix);
        let job_receiver = Arc::clone(&receiver);
        self.submit(receiver, move || {
            deployer.deploy(&hqf_paths, job_receiver.as_ref());
        });
    }

    pub fn submit_quick_fix_delete(&self, bundle_name: String, receiver: Arc<dyn StatusReceiver>) {
        let deployer = Arc::clone(&self.quick_fix);
        let job_receiver = Arc::clone(&receiver);
        self.submit(receiver, move || {
            deployer.delete(&bundle_name, job_receiver.as_ref());
        });
    }

    fn submit(&self, receiver: Arc<dyn StatusReceiver>, job: impl FnOnce() + Send + 'static) {
        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(Box::new(job)).is_ok());
        if !sent {
            let err = BmsError::Internal {
                message: "installer manager is shut down".to_string(),
            };
            receiver.on_finished(err.result_code(), &err.to_string());
        }
    }

    /// Stop accepting work and wait for queued jobs to finish
    pub fn shutdown(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("installer worker terminated abnormally");
            }
        }
    }
}

impl Drop for InstallerManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
