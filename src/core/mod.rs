//! core
//!
//! Pure building blocks shared by the shell, git, and lock layers.
//!
//! # Modules
//!
//! - [`duration`] - Rounding and display of elapsed times
//! - [`types`] - Validated git refs
//! - [`url`] - Normalized git remote URLs
//! - [`config`] - Configuration schema and loading
//!
//! Nothing here starts processes or touches the filesystem, apart from
//! reading configuration files.

pub mod config;
pub mod duration;
pub mod types;
pub mod url;
