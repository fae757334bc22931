//! Candidate config file scanning

use walkdir::WalkDir;

use appcfg_fs::{NormalizedPath, ProjectLayout};

use crate::model::{ConfigFile, ConfigFileType, ConfigIndex};
use crate::oracle::{IdentifierOracle, ServicesFileParser};

/// Scans a project's assets root for candidate config files.
pub struct ConfigFileIndex {
    layout: ProjectLayout,
    oracle: Box<dyn IdentifierOracle>,
}

impl ConfigFileIndex {
    /// Index backed by the in-process [`ServicesFileParser`].
    pub fn new(layout: ProjectLayout) -> Self {
        Self::with_oracle(layout, Box::new(ServicesFileParser::new()))
    }

    pub fn with_oracle(layout: ProjectLayout, oracle: Box<dyn IdentifierOracle>) -> Self {
        Self { layout, oracle }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Classify a path by its basename.
    pub fn file_type_of(&self, path: &NormalizedPath) -> Option<ConfigFileType> {
        if path.has_file_name(self.layout.structured_text_basename()) {
            Some(ConfigFileType::StructuredText)
        } else if path.has_file_name(self.layout.property_list_basename()) {
            Some(ConfigFileType::PropertyList)
        } else {
            None
        }
    }

    /// Scan the assets root and build a fresh index.
    ///
    /// Files the oracle cannot read are skipped with a warning, as are
    /// files that serve no identifier.
    pub fn rebuild(&self) -> ConfigIndex {
        let root = self.layout.assets_root();
        if !root.is_dir() {
            tracing::debug!(root = %root, "Assets root missing, index is empty");
            return ConfigIndex::default();
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root.to_native()).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry while scanning");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = NormalizedPath::new(entry.path());
            let Some(file_type) = self.file_type_of(&path) else {
                continue;
            };

            match self.oracle.list_identifiers(&path, file_type) {
                Ok(ids) => {
                    let ids: Vec<String> = ids.into_iter().filter(|id| !id.is_empty()).collect();
                    if ids.is_empty() {
                        tracing::warn!(path = %path, "Config file serves no identifiers, skipping");
                        continue;
                    }
                    files.push(ConfigFile::new(path, file_type, ids));
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to read config file, skipping");
                }
            }
        }

        let index = ConfigIndex::from_files(files);
        tracing::debug!(count = index.len(), "Rebuilt config index");
        index
    }
}
