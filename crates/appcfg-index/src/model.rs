//! Indexed config files

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use appcfg_fs::NormalizedPath;

/// Encoding of a candidate config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigFileType {
    /// JSON, consumed by Android and desktop targets
    StructuredText,
    /// Property list, consumed by the native IDE project
    PropertyList,
}

impl fmt::Display for ConfigFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredText => write!(f, "structured-text"),
            Self::PropertyList => write!(f, "property-list"),
        }
    }
}

/// A discovered config file and the identifiers it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: NormalizedPath,
    pub file_type: ConfigFileType,
    pub identifiers: BTreeSet<String>,
}

impl ConfigFile {
    pub fn new<I, S>(path: impl Into<NormalizedPath>, file_type: ConfigFileType, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            file_type,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn serves(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }
}

/// Every config file found by one scan, ordered by path.
///
/// Replaced wholesale on rescan; never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigIndex {
    files: BTreeMap<NormalizedPath, ConfigFile>,
}

impl ConfigIndex {
    pub fn from_files(files: impl IntoIterator<Item = ConfigFile>) -> Self {
        Self {
            files: files.into_iter().map(|f| (f.path.clone(), f)).collect(),
        }
    }

    pub fn get(&self, path: &NormalizedPath) -> Option<&ConfigFile> {
        self.files.get(path)
    }

    /// Files in path order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigFile> {
        self.files.values()
    }

    /// Files of one type, in path order.
    pub fn of_type(&self, file_type: ConfigFileType) -> impl Iterator<Item = &ConfigFile> {
        self.files.values().filter(move |f| f.file_type == file_type)
    }

    /// Union of identifiers across files of one type.
    pub fn identifiers(&self, file_type: ConfigFileType) -> BTreeSet<String> {
        self.of_type(file_type)
            .flat_map(|f| f.identifiers.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
