//! Generated native-project patching
//!
//! A [`NativeProjectTarget`] holds the application-info and entitlements
//! property lists of a generated native project, plus the resource files the
//! host should add to the project. Every edit is additive: values the
//! operator set by hand are never replaced.

use std::collections::BTreeMap;

use plist::{Dictionary, Value};

use appcfg_doc::PlistDocument;
use appcfg_fs::{NormalizedPath, ProjectLayout, io};

use crate::error::{Error, Result};

const URL_TYPES: &str = "CFBundleURLTypes";
const URL_NAME: &str = "CFBundleURLName";
const URL_SCHEMES: &str = "CFBundleURLSchemes";
const BACKGROUND_MODES: &str = "UIBackgroundModes";

/// Whether any URL type already lists `scheme`.
fn has_url_scheme(info: &PlistDocument, scheme: &str) -> bool {
    let Some(types) = info.get(URL_TYPES).and_then(Value::as_array) else {
        return false;
    };
    types
        .iter()
        .filter_map(Value::as_dictionary)
        .filter_map(|url_type| url_type.get(URL_SCHEMES).and_then(Value::as_array))
        .flatten()
        .any(|existing| existing.as_string() == Some(scheme))
}

/// Append `value` to the string array at `key`, creating it if absent.
fn push_unique_string(doc: &mut PlistDocument, key: &str, value: &str) -> bool {
    match doc.get_mut(key) {
        None => {
            doc.insert(key, Value::Array(vec![Value::String(value.to_string())]));
            true
        }
        Some(Value::Array(items)) => {
            if items.iter().any(|item| item.as_string() == Some(value)) {
                return false;
            }
            items.push(Value::String(value.to_string()));
            true
        }
        Some(_) => {
            tracing::warn!(key, "Existing value is not an array, leaving it untouched");
            false
        }
    }
}

/// A generated native project open for one patch session.
#[derive(Debug)]
pub struct NativeProjectTarget {
    project_root: NormalizedPath,
    info_path: NormalizedPath,
    entitlements_path: NormalizedPath,
    info: PlistDocument,
    entitlements: PlistDocument,
    entitlements_existed: bool,
    file_references: Vec<String>,
    config_values: BTreeMap<String, String>,
}

impl NativeProjectTarget {
    /// Open the native project generated at `project_root`.
    ///
    /// Missing property lists start empty. A malformed one is an error, since
    /// saving would discard whatever the generator wrote.
    pub fn open(layout: &ProjectLayout, project_root: impl Into<NormalizedPath>) -> Result<Self> {
        let project_root = project_root.into();
        let info_path = layout.info_plist_in(&project_root);
        let entitlements_path = layout.entitlements_in(&project_root);

        let info = PlistDocument::load_or_default(&info_path)?;
        let entitlements_existed = entitlements_path.is_file();
        let entitlements = PlistDocument::load_or_default(&entitlements_path)?;

        tracing::debug!(project = %project_root, "Opened native project");
        Ok(Self {
            project_root,
            info_path,
            entitlements_path,
            info,
            entitlements,
            entitlements_existed,
            file_references: Vec::new(),
            config_values: BTreeMap::new(),
        })
    }

    pub fn project_root(&self) -> &NormalizedPath {
        &self.project_root
    }

    pub fn info(&self) -> &PlistDocument {
        &self.info
    }

    pub fn entitlements(&self) -> &PlistDocument {
        &self.entitlements
    }

    /// Register a URL scheme unless some URL type already lists it.
    ///
    /// Returns `true` when a new URL type was appended.
    pub fn register_url_scheme(&mut self, name: &str, scheme: &str) -> bool {
        if has_url_scheme(&self.info, scheme) {
            return false;
        }

        let mut url_type = Dictionary::new();
        url_type.insert(URL_NAME.to_string(), Value::String(name.to_string()));
        url_type.insert(
            URL_SCHEMES.to_string(),
            Value::Array(vec![Value::String(scheme.to_string())]),
        );

        match self.info.get_mut(URL_TYPES) {
            None => {
                self.info
                    .insert(URL_TYPES, Value::Array(vec![Value::Dictionary(url_type)]));
            }
            Some(Value::Array(types)) => types.push(Value::Dictionary(url_type)),
            Some(_) => {
                tracing::warn!(scheme, "{URL_TYPES} is not an array, scheme not registered");
                return false;
            }
        }
        tracing::debug!(name, scheme, "Registered URL scheme");
        true
    }

    /// Set an application-info value only if `key` is wholly absent.
    pub fn set_info_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.info.contains_key(key) {
            return false;
        }
        self.info.insert(key, value);
        true
    }

    /// Set a usage-description string only if `key` is wholly absent.
    pub fn set_usage_permission_if_absent(&mut self, key: &str, text: &str) -> bool {
        self.set_info_if_absent(key, text)
    }

    /// Set an entitlement only if `key` is wholly absent.
    pub fn set_entitlement_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.entitlements.contains_key(key) {
            return false;
        }
        self.entitlements.insert(key, value);
        true
    }

    /// Add a background mode to the application info.
    pub fn add_background_mode(&mut self, mode: &str) -> bool {
        push_unique_string(&mut self.info, BACKGROUND_MODES, mode)
    }

    /// Copy a property-list config to the project root, overwriting any
    /// previous copy, and load its string values.
    pub fn copy_config_into_project(&mut self, source: &NormalizedPath) -> Result<NormalizedPath> {
        let basename = source.file_name().ok_or_else(|| Error::OutsideProject {
            path: source.to_native(),
        })?;
        let destination = self.project_root.join(basename);
        io::copy_file(source, &destination)?;

        let copied = PlistDocument::load(&destination)?;
        self.config_values = copied
            .dictionary()
            .iter()
            .filter_map(|(key, value)| value.as_string().map(|v| (key.clone(), v.to_string())))
            .collect();

        tracing::info!(source = %source, destination = %destination, "Copied config into native project");
        Ok(destination)
    }

    /// String value from the copied config.
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config_values.get(key).map(String::as_str)
    }

    /// Reference `path` as a project resource. Returns `false` if already referenced.
    pub fn add_file_reference(&mut self, path: &NormalizedPath) -> Result<bool> {
        let relative = path
            .relative_to(&self.project_root)
            .filter(|rel| !rel.is_empty())
            .ok_or_else(|| Error::OutsideProject {
                path: path.to_native(),
            })?;

        if self.file_references.contains(&relative) {
            return Ok(false);
        }
        self.file_references.push(relative);
        Ok(true)
    }

    /// Project-relative resource paths, in the order they were added.
    pub fn file_references(&self) -> &[String] {
        &self.file_references
    }

    /// Write both property lists, ending the session.
    ///
    /// Both writes are attempted even if the first fails; the first error is
    /// returned. An entitlements file is only created when it has content.
    pub fn save(self) -> Result<Vec<NormalizedPath>> {
        let mut written = Vec::new();
        let mut first_error = None;

        let mut pending = vec![(&self.info_path, &self.info)];
        if self.entitlements_existed || !self.entitlements.dictionary().is_empty() {
            pending.push((&self.entitlements_path, &self.entitlements));
        }

        for (path, document) in pending {
            match document.save(path) {
                Ok(()) => written.push(path.clone()),
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to save property list");
                    first_error.get_or_insert(Error::from(e));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }
}
