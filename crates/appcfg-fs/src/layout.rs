//! Fixed relative paths of a host project
//!
//! Every path the engine reads or writes is derived from a [`ProjectLayout`].
//! Defaults match a stock project; `.appcfg/layout.toml` may override them.

use serde::{Deserialize, Serialize};

use crate::{ConfigStore, NormalizedPath, Result};

/// Location of the optional layout override file, relative to the project root.
pub const LAYOUT_OVERRIDE_FILE: &str = ".appcfg/layout.toml";

/// Relative paths and recognized basenames, all overridable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Root scanned for candidate config files
    pub assets_root: String,
    /// Basename of the structured-text config file
    pub structured_text_basename: String,
    /// Basename of the property-list config file
    pub property_list_basename: String,
    /// Android application manifest
    pub manifest: String,
    /// Android string resources generated from the structured-text config
    pub values_resource: String,
    /// Desktop config written into streaming assets
    pub desktop_config: String,
    /// Per-feature settings store
    pub settings: String,
    /// Application-info property list, relative to the generated native project
    pub info_plist: String,
    /// Entitlements property list, relative to the generated native project
    pub entitlements: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            assets_root: "Assets".into(),
            structured_text_basename: "google-services.json".into(),
            property_list_basename: "GoogleService-Info.plist".into(),
            manifest: "Assets/Plugins/Android/AndroidManifest.xml".into(),
            values_resource: "Assets/Plugins/Android/AppConfig.androidlib/res/values/google-services.xml"
                .into(),
            desktop_config: "Assets/StreamingAssets/google-services-desktop.json".into(),
            settings: "ProjectSettings/AppConfigFeatures.toml".into(),
            info_plist: "Info.plist".into(),
            entitlements: "Unity-iPhone/Unity-iPhone.entitlements".into(),
        }
    }
}

/// A project root paired with its layout.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: NormalizedPath,
    config: LayoutConfig,
}

impl ProjectLayout {
    /// Layout with default paths.
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self::with_config(root, LayoutConfig::default())
    }

    pub fn with_config(root: impl Into<NormalizedPath>, config: LayoutConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load the layout for `root`, applying `.appcfg/layout.toml` if present.
    pub fn load(root: impl Into<NormalizedPath>) -> Result<Self> {
        let root = root.into();
        let config: LayoutConfig =
            ConfigStore::new().load_or_default(&root.join(LAYOUT_OVERRIDE_FILE))?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn assets_root(&self) -> NormalizedPath {
        self.root.join(&self.config.assets_root)
    }

    pub fn manifest_path(&self) -> NormalizedPath {
        self.root.join(&self.config.manifest)
    }

    pub fn values_resource_path(&self) -> NormalizedPath {
        self.root.join(&self.config.values_resource)
    }

    pub fn desktop_config_path(&self) -> NormalizedPath {
        self.root.join(&self.config.desktop_config)
    }

    pub fn settings_path(&self) -> NormalizedPath {
        self.root.join(&self.config.settings)
    }

    pub fn structured_text_basename(&self) -> &str {
        &self.config.structured_text_basename
    }

    pub fn property_list_basename(&self) -> &str {
        &self.config.property_list_basename
    }

    /// Whether a path names one of the recognized config basenames.
    pub fn is_candidate(&self, path: &NormalizedPath) -> bool {
        path.has_file_name(self.structured_text_basename())
            || path.has_file_name(self.property_list_basename())
    }

    /// Application-info property list inside a generated native project.
    pub fn info_plist_in(&self, native_project: &NormalizedPath) -> NormalizedPath {
        native_project.join(&self.config.info_plist)
    }

    /// Entitlements property list inside a generated native project.
    pub fn entitlements_in(&self, native_project: &NormalizedPath) -> NormalizedPath {
        native_project.join(&self.config.entitlements)
    }
}
