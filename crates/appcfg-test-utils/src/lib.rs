//! Shared test utilities for the appcfg workspace.
//!
//! - [`project`]: temporary host projects populated with config files.

pub mod project;

pub use project::{FixtureProject, services_json, services_plist};
