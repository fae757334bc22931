//! Android manifest patching
//!
//! Keyed entries are `<meta-data>` children of `<application>`, identified by
//! their `android:name`. Every operation leaves at most one entry per key.
//! A document without a `<manifest>` root or `<application>` parent is left
//! untouched.

use appcfg_doc::{XmlDocument, XmlElement};
use appcfg_fs::NormalizedPath;

use crate::error::Result;

pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

const ROOT: &str = "manifest";
const PARENT: &str = "application";
const ENTRY: &str = "meta-data";
const PERMISSION: &str = "uses-permission";
const NAME_ATTR: &str = "android:name";
const VALUE_ATTR: &str = "android:value";
const RESOURCE_ATTR: &str = "android:resource";

/// Whether the document has the structure patches need.
pub fn is_patchable(doc: &XmlDocument) -> bool {
    doc.root
        .as_ref()
        .is_some_and(|root| root.name == ROOT && root.find(PARENT).is_some())
}

fn manifest_mut(doc: &mut XmlDocument) -> Option<&mut XmlElement> {
    doc.root.as_mut().filter(|root| root.name == ROOT)
}

fn application_mut(doc: &mut XmlDocument) -> Option<&mut XmlElement> {
    manifest_mut(doc)?.find_mut(PARENT)
}

fn is_entry(el: &XmlElement, key: &str) -> bool {
    el.name == ENTRY && el.attr(NAME_ATTR) == Some(key)
}

/// Find the entry for `key`, dropping duplicates, or append a new one.
fn upsert_entry<'a>(application: &'a mut XmlElement, key: &str) -> Option<&'a mut XmlElement> {
    let mut seen = false;
    application.retain_elements(|el| {
        if !is_entry(el, key) {
            return true;
        }
        let keep = !seen;
        seen = true;
        keep
    });

    if !seen {
        application.push(XmlElement::new(ENTRY).with_attr(NAME_ATTR, key));
    }
    application.elements_mut().find(|el| is_entry(el, key))
}

/// Set `android:value` for `key`. Returns `false` if the document is not patchable.
pub fn set_value(doc: &mut XmlDocument, key: &str, value: &str) -> bool {
    let Some(entry) = application_mut(doc).and_then(|app| upsert_entry(app, key)) else {
        tracing::warn!(key, "Manifest has no <application>, skipping value");
        return false;
    };
    entry.remove_attr(RESOURCE_ATTR);
    entry.set_attr(VALUE_ATTR, value);
    true
}

/// Set `android:resource` for `key`. Returns `false` if the document is not patchable.
pub fn set_resource(doc: &mut XmlDocument, key: &str, reference: &str) -> bool {
    let Some(entry) = application_mut(doc).and_then(|app| upsert_entry(app, key)) else {
        tracing::warn!(key, "Manifest has no <application>, skipping resource");
        return false;
    };
    entry.remove_attr(VALUE_ATTR);
    entry.set_attr(RESOURCE_ATTR, reference);
    true
}

/// Remove every entry for `key`, returning how many were removed.
pub fn delete_key(doc: &mut XmlDocument, key: &str) -> usize {
    application_mut(doc).map_or(0, |application| {
        application.retain_elements(|el| !is_entry(el, key))
    })
}

/// Value or resource reference stored for `key`.
pub fn get_value<'a>(doc: &'a XmlDocument, key: &str) -> Option<&'a str> {
    let root = doc.root.as_ref().filter(|root| root.name == ROOT)?;
    let entry = root.find(PARENT)?.elements().find(|el| is_entry(el, key))?;
    entry.attr(VALUE_ATTR).or_else(|| entry.attr(RESOURCE_ATTR))
}

/// Add `<uses-permission android:name="...">` under the root if missing.
///
/// Returns `true` when a node was added.
pub fn add_permission(doc: &mut XmlDocument, permission: &str) -> bool {
    let Some(root) = manifest_mut(doc) else {
        return false;
    };
    if root
        .elements()
        .any(|el| el.name == PERMISSION && el.attr(NAME_ATTR) == Some(permission))
    {
        return false;
    }
    root.push(XmlElement::new(PERMISSION).with_attr(NAME_ATTR, permission));
    true
}

/// Minimal manifest used when the project has none.
pub fn placeholder(package: &str) -> XmlDocument {
    let launcher = XmlElement::new("intent-filter")
        .with_child(XmlElement::new("action").with_attr(NAME_ATTR, "android.intent.action.MAIN"))
        .with_child(
            XmlElement::new("category").with_attr(NAME_ATTR, "android.intent.category.LAUNCHER"),
        );
    let activity = XmlElement::new("activity")
        .with_attr(NAME_ATTR, "com.unity3d.player.UnityPlayerActivity")
        .with_attr("android:exported", "true")
        .with_child(launcher);
    let root = XmlElement::new(ROOT)
        .with_attr("xmlns:android", ANDROID_NS)
        .with_attr("package", package)
        .with_child(XmlElement::new(PARENT).with_child(activity));
    XmlDocument::new(root)
}

/// The project's Android manifest, open for one patch session.
#[derive(Debug)]
pub struct ManifestTarget {
    path: NormalizedPath,
    document: XmlDocument,
    synthesized: bool,
}

impl ManifestTarget {
    /// Open the manifest at `path`.
    ///
    /// A missing file becomes a placeholder for `package`. A malformed file
    /// yields an empty, unpatchable document so the build carries on.
    pub fn open(path: NormalizedPath, package: &str) -> Self {
        if !path.is_file() {
            tracing::info!(path = %path, "Manifest missing, synthesizing placeholder");
            return Self {
                path,
                document: placeholder(package),
                synthesized: true,
            };
        }

        let document = match XmlDocument::load(&path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Manifest unreadable, patches will be skipped");
                XmlDocument::default()
            }
        };
        if !is_patchable(&document) {
            tracing::warn!(path = %path, "Manifest lacks <manifest>/<application>, patches will be skipped");
        }
        Self {
            path,
            document,
            synthesized: false,
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        set_value(&mut self.document, key, value)
    }

    pub fn set_resource(&mut self, key: &str, reference: &str) -> bool {
        set_resource(&mut self.document, key, reference)
    }

    pub fn delete_key(&mut self, key: &str) -> usize {
        delete_key(&mut self.document, key)
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        get_value(&self.document, key)
    }

    pub fn add_permission(&mut self, permission: &str) -> bool {
        add_permission(&mut self.document, permission)
    }

    /// Write the manifest, ending the session.
    ///
    /// Unpatchable documents are not written. Returns whether a write happened.
    pub fn save(self) -> Result<bool> {
        if !is_patchable(&self.document) {
            return Ok(false);
        }
        self.document.save(&self.path)?;
        tracing::debug!(path = %self.path, "Saved manifest");
        Ok(true)
    }
}
