//! Filesystem primitives for appcfg
//!
//! Provides normalized path handling, atomic I/O, format-agnostic config
//! loading and the fixed relative paths of a host project.

pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use layout::{LayoutConfig, ProjectLayout};
pub use path::NormalizedPath;
