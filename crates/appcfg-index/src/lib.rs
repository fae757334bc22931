//! Config file discovery and resolution.
//!
//! [`ConfigFileIndex`] scans the assets root for candidate config files and
//! asks an [`IdentifierOracle`] which application identifiers each one
//! serves. [`ConfigResolver`] then picks the file for a wanted identifier.
//! The `desktop` and `values` modules derive secondary artifacts from the
//! selected file.

pub mod desktop;
pub mod error;
pub mod index;
pub mod model;
pub mod oracle;
pub mod resolver;
pub mod values;

pub use error::{Error, Result};
pub use index::ConfigFileIndex;
pub use model::{ConfigFile, ConfigFileType, ConfigIndex};
pub use oracle::{IdentifierOracle, ServicesFileParser, ServicesJson};
pub use resolver::{ConfigResolver, Resolution, ResolveMode};
