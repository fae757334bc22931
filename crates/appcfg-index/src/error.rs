//! Error types for appcfg-index

use std::path::PathBuf;

use crate::model::ConfigFileType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] appcfg_fs::Error),

    #[error("Document error: {0}")]
    Doc(#[from] appcfg_doc::Error),

    #[error("Malformed JSON config at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config at {path} has no {key}")]
    MissingKey { path: PathBuf, key: String },

    #[error("No {file_type} config file matches identifier '{identifier}'")]
    NoMatchingConfig {
        file_type: ConfigFileType,
        identifier: String,
    },

    #[error("Config at {path} has no client for package '{package_name}'")]
    NoMatchingClient { path: PathBuf, package_name: String },
}
