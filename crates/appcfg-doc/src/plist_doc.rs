//! Property-list documents

use std::io::Cursor;

use plist::{Dictionary, Value};

use appcfg_fs::{NormalizedPath, io};

use crate::error::{Error, Result};

/// A property list whose root is a dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlistDocument {
    root: Dictionary,
}

impl PlistDocument {
    /// An empty dictionary document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dictionary(root: Dictionary) -> Self {
        Self { root }
    }

    /// Load from disk. Binary and XML encodings are both accepted.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        let bytes = std::fs::read(&native).map_err(|e| appcfg_fs::Error::io(&native, e))?;
        let value = Value::from_reader(Cursor::new(bytes)).map_err(|source| Error::Plist {
            path: native.clone(),
            source,
        })?;
        value
            .into_dictionary()
            .map(Self::from_dictionary)
            .ok_or(Error::PlistRoot { path: native })
    }

    /// Load from disk, or start from an empty dictionary if the file is absent.
    pub fn load_or_default(path: &NormalizedPath) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path, "Property list absent, starting empty");
            Ok(Self::new())
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.root.get_mut(key)
    }

    /// String value at `key`, if present and a string.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_string)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.root.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.root.remove(key)
    }

    /// Serialize as an XML property list.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        Value::Dictionary(self.root.clone())
            .to_writer_xml(&mut out)
            .map_err(|source| Error::Plist {
                path: "<memory>".into(),
                source,
            })?;
        Ok(out)
    }

    /// Write the document to `path` atomically as an XML property list.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        let bytes = self.to_xml_bytes()?;
        io::write_atomic(path, &bytes)?;
        Ok(())
    }
}
