//! Error types for appcfg-doc

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] appcfg_fs::Error),

    #[error("Malformed XML: {message}")]
    Xml { message: String },

    #[error("Malformed property list at {path}: {source}")]
    Plist {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    #[error("Property list root at {path} is not a dictionary")]
    PlistRoot { path: PathBuf },
}

impl Error {
    pub(crate) fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: message.to_string(),
        }
    }
}
