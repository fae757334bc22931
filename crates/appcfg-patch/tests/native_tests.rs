//! Generated native project patching.

use appcfg_doc::PlistDocument;
use appcfg_fs::{NormalizedPath, ProjectLayout};
use appcfg_patch::{Error, NativeProjectTarget};
use appcfg_test_utils::{FixtureProject, services_plist};
use plist::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

const INFO_WITH_SCHEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>com.example.app</string>
    <key>CFBundleURLTypes</key>
    <array>
        <dict>
            <key>CFBundleURLSchemes</key>
            <array><string>manual-scheme</string></array>
        </dict>
    </array>
    <key>NSCameraUsageDescription</key>
    <string>Written by hand</string>
</dict>
</plist>
"#;

fn scheme_count(target: &NativeProjectTarget) -> usize {
    target
        .info()
        .get("CFBundleURLTypes")
        .and_then(Value::as_array)
        .map_or(0, |types| {
            types
                .iter()
                .filter_map(Value::as_dictionary)
                .filter_map(|t| t.get("CFBundleURLSchemes").and_then(Value::as_array))
                .map(Vec::len)
                .sum()
        })
}

fn open(project: &FixtureProject) -> NativeProjectTarget {
    let root = project.mkdir("Build/ios");
    NativeProjectTarget::open(&project.layout(), NormalizedPath::new(root)).unwrap()
}

#[test]
fn test_url_scheme_is_registered_once() {
    let project = FixtureProject::new();
    let mut target = open(&project);

    assert!(target.register_url_scheme("auth", "com.example.apps.abc-123"));
    assert!(!target.register_url_scheme("auth", "com.example.apps.abc-123"));

    assert_eq!(scheme_count(&target), 1);
}

#[test]
fn test_url_scheme_already_listed_by_hand_is_not_added() {
    let project = FixtureProject::new();
    project.write_file("Build/ios/Info.plist", INFO_WITH_SCHEME);
    let mut target = open(&project);

    assert!(!target.register_url_scheme("links", "manual-scheme"));
    assert!(target.register_url_scheme("links", "other-scheme"));

    assert_eq!(scheme_count(&target), 2);
}

#[test]
fn test_usage_permission_respects_manual_edit() {
    let project = FixtureProject::new();
    project.write_file("Build/ios/Info.plist", INFO_WITH_SCHEME);
    let mut target = open(&project);

    assert!(!target.set_usage_permission_if_absent("NSCameraUsageDescription", "Generated"));
    assert!(target.set_usage_permission_if_absent("NSMicrophoneUsageDescription", "Generated"));

    assert_eq!(target.info().string("NSCameraUsageDescription"), Some("Written by hand"));
    assert_eq!(target.info().string("NSMicrophoneUsageDescription"), Some("Generated"));
}

#[test]
fn test_config_copy_overwrites_and_exposes_values() {
    let project = FixtureProject::new();
    let source = NormalizedPath::new(project.add_services_plist("Config", "com.example.app"));
    project.write_file("Build/ios/GoogleService-Info.plist", "stale");
    let mut target = open(&project);

    let copied = target.copy_config_into_project(&source).unwrap();

    assert_eq!(copied.file_name(), Some("GoogleService-Info.plist"));
    assert_eq!(
        std::fs::read_to_string(copied.to_native()).unwrap(),
        services_plist("com.example.app")
    );
    assert_eq!(target.config_value("BUNDLE_ID"), Some("com.example.app"));
    assert_eq!(target.config_value("REVERSED_CLIENT_ID"), Some("com.example.apps.abc-123"));
}

#[test]
fn test_file_reference_is_relative_and_deduplicated() {
    let project = FixtureProject::new();
    let mut target = open(&project);
    let inside = target.project_root().join("GoogleService-Info.plist");

    assert!(target.add_file_reference(&inside).unwrap());
    assert!(!target.add_file_reference(&inside).unwrap());

    assert_eq!(target.file_references(), ["GoogleService-Info.plist".to_string()]);
}

#[rstest]
#[case::sibling_directory("Assets/GoogleService-Info.plist")]
#[case::climbs_out_of_project("Build/ios/../../Assets/GoogleService-Info.plist")]
#[case::climbs_to_sibling_name("Build/ios/../ios-other/GoogleService-Info.plist")]
fn test_file_reference_outside_project_is_rejected(#[case] relative: &str) {
    let project = FixtureProject::new();
    let mut target = open(&project);
    let outside = NormalizedPath::new(format!("{}/{relative}", project.root().display()));

    let err = target.add_file_reference(&outside).unwrap_err();

    assert!(matches!(err, Error::OutsideProject { .. }));
    assert!(target.file_references().is_empty());
}

#[test]
fn test_save_skips_empty_new_entitlements() {
    let project = FixtureProject::new();
    let layout = ProjectLayout::new(project.root());
    let mut target = open(&project);
    target.add_background_mode("remote-notification");
    let root = target.project_root().clone();

    let written = target.save().unwrap();

    assert_eq!(written, vec![layout.info_plist_in(&root)]);
    assert!(!layout.entitlements_in(&root).exists());
}

#[test]
fn test_save_writes_entitlements_once_they_have_content() {
    let project = FixtureProject::new();
    let layout = ProjectLayout::new(project.root());
    let mut target = open(&project);
    assert!(target.set_entitlement_if_absent("aps-environment", "development"));
    assert!(!target.set_entitlement_if_absent("aps-environment", "production"));
    let root = target.project_root().clone();

    target.save().unwrap();

    let entitlements = PlistDocument::load(&layout.entitlements_in(&root)).unwrap();
    assert_eq!(entitlements.string("aps-environment"), Some("development"));
}

#[test]
fn test_reopen_after_save_is_stable() {
    let project = FixtureProject::new();
    let mut first = open(&project);
    first.register_url_scheme("auth", "scheme-a");
    first.add_background_mode("fetch");
    first.save().unwrap();

    let mut second = open(&project);
    assert!(!second.register_url_scheme("auth", "scheme-a"));
    assert!(!second.add_background_mode("fetch"));
    assert_eq!(scheme_count(&second), 1);
}
