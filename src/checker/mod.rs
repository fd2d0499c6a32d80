//! Pre-install checkers
//!
//! Each checker is a deterministic function of the candidate batch and the
//! committed registry state. The first failing rule wins; checkers never
//! write anything.
//!
//! - [`compatibility`]: version, label, signature and entry rules
//! - [`overlay`]: overlay module and overlay bundle rules
//! - [`quick_fix`]: patch and hot reload rules

pub mod compatibility;
pub mod overlay;
pub mod quick_fix;

pub use compatibility::{check, check_batch};
pub use overlay::OverlayChecker;
