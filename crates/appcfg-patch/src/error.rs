//! Error types for appcfg-patch

use std::path::PathBuf;

use crate::feature::FeatureId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] appcfg_fs::Error),

    #[error("Document error: {0}")]
    Doc(#[from] appcfg_doc::Error),

    #[error("Invalid setting {key}: {message}")]
    Settings { key: String, message: String },

    #[error("Settings for {feature} must serialize to a table of fields")]
    SettingsShape { feature: FeatureId },

    #[error("Feature {feature} is already registered with a different settings type")]
    FeatureTypeMismatch { feature: FeatureId },

    #[error("Path {path} is outside the native project")]
    OutsideProject { path: PathBuf },

    #[error("{feature} patch failed: {message}")]
    Feature { feature: FeatureId, message: String },
}
