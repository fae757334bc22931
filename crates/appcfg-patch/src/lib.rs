//! Idempotent patching of generated native artifacts.
//!
//! # Architecture
//!
//! A patch session opens one target, lets every registered feature edit it,
//! and saves it once:
//!
//! 1. [`ManifestTarget`] / [`NativeProjectTarget`] wrap the parsed documents.
//!    Their edit operations are idempotent, so repeated builds converge.
//! 2. [`PatchRegistry`] maps each [`FeatureId`] to the callbacks contributed
//!    for it. `run_all` loads that feature's persisted settings once and
//!    hands them to each callback.
//! 3. [`SettingsStore`] is the key/value store the settings come from.

pub mod error;
pub mod feature;
pub mod manifest;
pub mod native;
pub mod registry;
pub mod settings;

pub use error::{Error, Result};
pub use feature::{FeatureId, FeatureSettings};
pub use manifest::ManifestTarget;
pub use native::NativeProjectTarget;
pub use registry::{FeatureFailure, PatchRegistry, RunReport};
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore, load_into, save_from};
