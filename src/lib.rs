//! Bundle management service
//!
//! Install, update and uninstall transactions for application bundles made of
//! HAP/HSP modules, with the version, signature, overlay and quick fix
//! compatibility checks an installed bundle has to keep satisfying.
//!
//! The entry points are [`installer::BundleInstaller`] for synchronous use and
//! [`installer::InstallerManager`] for a worker pool. Both report through a
//! [`receiver::StatusReceiver`].

pub mod checker;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod hash;
pub mod installer;
pub mod parser;
pub mod quick_fix;
pub mod receiver;
pub mod registry;
pub mod signature;
pub mod transaction;

#[cfg(test)]
mod test_fixtures;
