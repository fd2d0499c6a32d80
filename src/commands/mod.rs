//! Command implementations for the bms CLI

pub mod completions;
pub mod helpers;
pub mod install;
pub mod list;
pub mod quick_fix;
pub mod show;
pub mod uninstall;
pub mod version;
