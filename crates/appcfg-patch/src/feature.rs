//! Feature identifiers and their settings types

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

/// A feature module that contributes patches.
///
/// Registries run features in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureId {
    App,
    Analytics,
    Auth,
    Crashlytics,
    DynamicLinks,
    Messaging,
}

impl FeatureId {
    /// Key segment used in the settings store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Analytics => "analytics",
            Self::Auth => "auth",
            Self::Crashlytics => "crashlytics",
            Self::DynamicLinks => "dynamic-links",
            Self::Messaging => "messaging",
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted settings owned by one feature.
///
/// The type must serialize as a struct; each field is stored under its own
/// key so fields added later fall back to their defaults.
pub trait FeatureSettings: Default + Serialize + DeserializeOwned + 'static {
    const FEATURE: FeatureId;
}
