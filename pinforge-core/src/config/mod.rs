//! Configuration types
//!
//! Board capability profiles and runtime shell settings.

pub mod profile;
pub mod types;

#[cfg(feature = "serde")]
pub mod persist;

pub use profile::*;
pub use types::*;
