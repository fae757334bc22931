//! Document handles for generated native artifacts.
//!
//! [`XmlDocument`] is an owned element tree read and written with
//! `quick-xml`; [`PlistDocument`] wraps a `plist` dictionary. Both load from
//! and save to a [`appcfg_fs::NormalizedPath`] and expose get/set/children
//! operations for the patchers.

pub mod error;
pub mod plist_doc;
pub mod xml;

pub use error::{Error, Result};
pub use plist_doc::PlistDocument;
pub use xml::{XmlDocument, XmlElement, XmlNode};
