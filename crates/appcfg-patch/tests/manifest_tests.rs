//! Android manifest patching.

use appcfg_doc::XmlDocument;
use appcfg_fs::NormalizedPath;
use appcfg_patch::ManifestTarget;
use appcfg_patch::manifest::{self, add_permission, delete_key, get_value, set_resource, set_value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
    <!-- generated -->
    <application android:label="Demo">
        <meta-data android:name="existing" android:value="1"/>
    </application>
</manifest>
"#;

fn entries(doc: &XmlDocument, key: &str) -> usize {
    doc.root
        .as_ref()
        .and_then(|root| root.find("application"))
        .map_or(0, |app| {
            app.elements()
                .filter(|el| el.name == "meta-data" && el.attr("android:name") == Some(key))
                .count()
        })
}

#[test]
fn test_set_value_updates_existing_entry_in_place() {
    let mut doc = XmlDocument::parse(MANIFEST).unwrap();

    assert!(set_value(&mut doc, "existing", "2"));

    assert_eq!(entries(&doc, "existing"), 1);
    assert_eq!(get_value(&doc, "existing"), Some("2"));
}

#[test]
fn test_set_value_collapses_duplicates() {
    let mut doc = XmlDocument::parse(
        r#"<manifest><application>
            <meta-data android:name="k" android:value="a"/>
            <meta-data android:name="k" android:value="b"/>
        </application></manifest>"#,
    )
    .unwrap();

    set_value(&mut doc, "k", "c");

    assert_eq!(entries(&doc, "k"), 1);
    assert_eq!(get_value(&doc, "k"), Some("c"));
}

#[test]
fn test_set_resource_replaces_value_attribute() {
    let mut doc = XmlDocument::parse(MANIFEST).unwrap();

    set_resource(&mut doc, "existing", "@drawable/icon");

    let app = doc.root.as_ref().unwrap().find("application").unwrap();
    let entry = app.find("meta-data").unwrap();
    assert_eq!(entry.attr("android:value"), None);
    assert_eq!(entry.attr("android:resource"), Some("@drawable/icon"));
}

#[test]
fn test_delete_key_removes_every_match() {
    let mut doc = XmlDocument::parse(
        r#"<manifest><application>
            <meta-data android:name="gone" android:value="a"/>
            <meta-data android:name="kept" android:value="b"/>
            <meta-data android:name="gone" android:value="c"/>
        </application></manifest>"#,
    )
    .unwrap();

    assert_eq!(delete_key(&mut doc, "gone"), 2);
    assert_eq!(entries(&doc, "gone"), 0);
    assert_eq!(entries(&doc, "kept"), 1);
    assert_eq!(delete_key(&mut doc, "gone"), 0);
}

#[test]
fn test_operations_without_application_are_noops() {
    let original = XmlDocument::parse(r#"<manifest package="x"><uses-sdk/></manifest>"#).unwrap();
    let mut doc = original.clone();

    assert!(!set_value(&mut doc, "k", "v"));
    assert!(!set_resource(&mut doc, "k", "@string/v"));
    assert_eq!(delete_key(&mut doc, "k"), 0);

    assert_eq!(doc, original);
    assert!(!manifest::is_patchable(&doc));
}

#[test]
fn test_permission_is_added_once() {
    let mut doc = XmlDocument::parse(MANIFEST).unwrap();

    assert!(add_permission(&mut doc, "android.permission.INTERNET"));
    assert!(!add_permission(&mut doc, "android.permission.INTERNET"));

    let count = doc
        .root
        .as_ref()
        .unwrap()
        .elements()
        .filter(|el| el.name == "uses-permission")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_placeholder_patch_save_reparse_adds_one_node() {
    let dir = TempDir::new().unwrap();
    let path = NormalizedPath::new(dir.path().join("AndroidManifest.xml"));

    let mut target = ManifestTarget::open(path.clone(), "com.example.app");
    assert!(target.is_synthesized());
    let before = target.document().root.as_ref().unwrap().element_count();

    assert!(target.set_value("com.example.key", "on"));
    assert!(target.save().unwrap());

    let reparsed = XmlDocument::load(&path).unwrap();
    let after = reparsed.root.as_ref().unwrap().element_count();
    assert_eq!(after, before + 1);
    assert_eq!(get_value(&reparsed, "com.example.key"), Some("on"));
    assert_eq!(reparsed.root.as_ref().unwrap().attr("package"), Some("com.example.app"));
}

#[test]
fn test_malformed_manifest_is_left_on_disk_untouched() {
    let dir = TempDir::new().unwrap();
    let native = dir.path().join("AndroidManifest.xml");
    std::fs::write(&native, "<manifest><application>").unwrap();

    let mut target = ManifestTarget::open(NormalizedPath::new(&native), "com.example.app");
    assert!(!target.is_synthesized());
    assert!(!target.set_value("k", "v"));
    assert!(!target.save().unwrap());

    assert_eq!(std::fs::read_to_string(&native).unwrap(), "<manifest><application>");
}

#[test]
fn test_existing_manifest_keeps_comments_after_save() {
    let dir = TempDir::new().unwrap();
    let native = dir.path().join("AndroidManifest.xml");
    std::fs::write(&native, MANIFEST).unwrap();

    let mut target = ManifestTarget::open(NormalizedPath::new(&native), "ignored");
    target.set_value("added", "yes");
    target.save().unwrap();

    let written = std::fs::read_to_string(&native).unwrap();
    assert!(written.contains("<!--"), "{written}");
    assert!(written.contains(r#"android:label="Demo""#), "{written}");
    assert!(written.contains(r#"android:name="added""#), "{written}");
}

proptest! {
    #[test]
    fn test_repeated_set_value_leaves_one_node(
        key in "[a-z][a-z0-9_.]{0,20}",
        values in prop::collection::vec("[a-zA-Z0-9]{0,8}", 1..8),
    ) {
        let mut doc = manifest::placeholder("com.example.app");
        for value in &values {
            prop_assert!(set_value(&mut doc, &key, value));
        }

        prop_assert_eq!(entries(&doc, &key), 1);
        prop_assert_eq!(get_value(&doc, &key), values.last().map(String::as_str));
    }
}
