//! Error types for appcfg-hooks

use crate::identity::BuildTarget;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] appcfg_fs::Error),

    #[error(transparent)]
    Doc(#[from] appcfg_doc::Error),

    #[error(transparent)]
    Index(#[from] appcfg_index::Error),

    #[error(transparent)]
    Patch(#[from] appcfg_patch::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("No application identifier configured for {target}")]
    MissingIdentifier { target: BuildTarget },
}
