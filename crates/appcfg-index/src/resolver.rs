//! Selection of the config file for an application identifier

use appcfg_fs::NormalizedPath;

use crate::error::{Error, Result};
use crate::model::{ConfigFile, ConfigFileType, ConfigIndex};

/// Which files qualify as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Only files serving the wanted identifier
    MatchOnly,
    /// Any file of the requested type, regardless of identifier
    ReturnAll,
}

/// Outcome of [`ConfigResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate
    Selected(ConfigFile),
    /// Several candidates; `selected` is the first by path
    Ambiguous {
        selected: ConfigFile,
        candidates: Vec<NormalizedPath>,
    },
    NotFound,
}

impl Resolution {
    pub fn selected(&self) -> Option<&ConfigFile> {
        match self {
            Self::Selected(file) | Self::Ambiguous { selected: file, .. } => Some(file),
            Self::NotFound => None,
        }
    }

    pub fn into_selected(self) -> Option<ConfigFile> {
        match self {
            Self::Selected(file) | Self::Ambiguous { selected: file, .. } => Some(file),
            Self::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Informational message naming every candidate of an ambiguous pick.
    pub fn notice(&self) -> Option<String> {
        let Self::Ambiguous {
            selected,
            candidates,
        } = self
        else {
            return None;
        };
        let names: Vec<&str> = candidates.iter().map(NormalizedPath::as_str).collect();
        Some(format!(
            "Found {} matching config files ({}); using {}",
            candidates.len(),
            names.join(", "),
            selected.path
        ))
    }

    /// Turn `NotFound` into an error when the consuming feature is active.
    ///
    /// Inactive consumers get `Ok(None)`.
    pub fn require(
        self,
        active: bool,
        file_type: ConfigFileType,
        identifier: &str,
    ) -> Result<Option<ConfigFile>> {
        match self.into_selected() {
            Some(file) => Ok(Some(file)),
            None if active => Err(Error::NoMatchingConfig {
                file_type,
                identifier: identifier.to_string(),
            }),
            None => Ok(None),
        }
    }
}

/// Resolves config files against one index.
pub struct ConfigResolver<'a> {
    index: &'a ConfigIndex,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(index: &'a ConfigIndex) -> Self {
        Self { index }
    }

    /// Pick the config file of `file_type` for `wanted_id`.
    ///
    /// Among several candidates the lexicographically first path wins, so
    /// the result depends only on the index contents.
    pub fn resolve(&self, file_type: ConfigFileType, wanted_id: &str, mode: ResolveMode) -> Resolution {
        // Index iteration is already in path order
        let mut matches: Vec<&ConfigFile> = self
            .index
            .of_type(file_type)
            .filter(|f| mode == ResolveMode::ReturnAll || f.serves(wanted_id))
            .collect();

        match matches.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Selected(matches.remove(0).clone()),
            _ => {
                let resolution = Resolution::Ambiguous {
                    selected: matches[0].clone(),
                    candidates: matches.iter().map(|f| f.path.clone()).collect(),
                };
                if let Some(notice) = resolution.notice() {
                    tracing::info!(identifier = wanted_id, %file_type, "{}", notice);
                }
                resolution
            }
        }
    }
}
