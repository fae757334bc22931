//! Per-feature settings storage
//!
//! Settings are flattened into string keys of the form
//! `appcfg.features.<feature>.<field>` with JSON-encoded values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use appcfg_fs::{ConfigStore, NormalizedPath};

use crate::error::{Error, Result};
use crate::feature::{FeatureId, FeatureSettings};

/// Prefix shared by every feature settings key.
pub const SETTINGS_PREFIX: &str = "appcfg.features";

/// Opaque string key/value store.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Store key for one field of a feature's settings.
pub fn settings_key(feature: FeatureId, field: &str) -> String {
    format!("{SETTINGS_PREFIX}.{feature}.{field}")
}

/// Overwrite the fields of `target` that have a stored value.
///
/// Fields without a stored value keep whatever `target` already holds.
pub fn load_into<T: FeatureSettings>(store: &dyn SettingsStore, target: &mut T) -> Result<()> {
    let mut fields = fields_of(target)?;

    for (field, value) in fields.iter_mut() {
        let key = settings_key(T::FEATURE, field);
        if let Some(raw) = store.get(&key) {
            *value = serde_json::from_str(&raw).map_err(|e| Error::Settings {
                key: key.clone(),
                message: e.to_string(),
            })?;
        }
    }

    *target = serde_json::from_value(Value::Object(fields)).map_err(|e| Error::Settings {
        key: format!("{SETTINGS_PREFIX}.{}", T::FEATURE),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Store every field of `source`.
pub fn save_from<T: FeatureSettings>(store: &mut dyn SettingsStore, source: &T) -> Result<()> {
    for (field, value) in fields_of(source)? {
        store.set(&settings_key(T::FEATURE, &field), value.to_string());
    }
    Ok(())
}

fn fields_of<T: FeatureSettings>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(Error::SettingsShape {
            feature: T::FEATURE,
        }),
    }
}

/// In-memory store, mainly for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Store persisted as a flat TOML table.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: NormalizedPath,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl FileSettingsStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: NormalizedPath) -> Result<Self> {
        let values: BTreeMap<String, String> = ConfigStore::new().load_or_default(&path)?;
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes. Does nothing when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        ConfigStore::new().save(&self.path, &self.values)?;
        self.dirty = false;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }
}
