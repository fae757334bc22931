//! End-to-end pre-build and post-build runs against fixture projects.

use appcfg_doc::{PlistDocument, XmlDocument};
use appcfg_fs::NormalizedPath;
use appcfg_hooks::features::{AuthSettings, DynamicLinksSettings, MessagingSettings};
use appcfg_hooks::{
    BuildHooks, BuildTarget, Error, PromptOutcome, PromptRequest, PromptStatus, Prompter,
    StaticIdentity,
};
use appcfg_patch::manifest::get_value;
use appcfg_patch::{MemorySettingsStore, PatchRegistry, save_from};
use appcfg_test_utils::FixtureProject;
use plist::Value;
use pretty_assertions::assert_eq;

/// Fails the test if a prompt is raised.
struct NoPrompt;

impl Prompter for NoPrompt {
    fn choose(&mut self, request: &PromptRequest) -> appcfg_hooks::Result<PromptOutcome> {
        panic!("unexpected prompt: {request:?}");
    }
}

fn read(path: &NormalizedPath) -> String {
    std::fs::read_to_string(path.to_native()).unwrap()
}

fn messaging_store() -> MemorySettingsStore {
    let mut store = MemorySettingsStore::new();
    save_from(
        &mut store,
        &MessagingSettings {
            enabled: true,
            default_channel_id: Some("alerts".into()),
            ..MessagingSettings::default()
        },
    )
    .unwrap();
    store
}

#[test]
fn test_android_build_patches_manifest_and_writes_values() {
    let project = FixtureProject::new();
    project.add_services_json("Firebase", &["com.example.app", "com.example.other"]);
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let mut identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");
    let store = messaging_store();

    let pre = hooks.pre_build(BuildTarget::Android, &mut identity, &mut NoPrompt).unwrap();
    assert_eq!(pre.prompt, PromptStatus::NoMismatch);

    let report = hooks.post_build_android(&identity, &store).unwrap();
    assert!(report.is_success(), "{report:?}");

    let layout = hooks.layout().clone();
    let manifest = XmlDocument::load(&layout.manifest_path()).unwrap();
    assert_eq!(get_value(&manifest, "firebase_analytics_collection_enabled"), Some("true"));
    assert_eq!(
        get_value(
            &manifest,
            "com.google.firebase.messaging.default_notification_channel_id"
        ),
        Some("alerts")
    );
    assert!(read(&layout.manifest_path()).contains("android.permission.POST_NOTIFICATIONS"));

    let values = read(&layout.values_resource_path());
    assert!(values.contains("1:1234567890:android:0000"), "{values}");
    assert!(values.contains("key-0"), "{values}");
    assert!(!values.contains("key-1"), "{values}");
}

#[test]
fn test_android_build_is_idempotent() {
    let project = FixtureProject::new();
    project.add_services_json("Firebase", &["com.example.app"]);
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");
    let store = messaging_store();

    hooks.post_build_android(&identity, &store).unwrap();
    let first = read(&hooks.layout().manifest_path());
    hooks.post_build_android(&identity, &store).unwrap();
    let second = read(&hooks.layout().manifest_path());

    assert_eq!(first, second);
}

#[test]
fn test_android_build_without_config_fails_when_features_are_active() {
    let project = FixtureProject::new();
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");

    let err = hooks
        .post_build_android(&identity, &MemorySettingsStore::new())
        .unwrap_err();

    assert!(matches!(err, Error::Index(_)), "{err}");
    assert!(!hooks.layout().manifest_path().exists());
}

#[test]
fn test_android_build_without_config_or_features_succeeds() {
    let project = FixtureProject::new();
    let layout = project.layout();
    let mut hooks = BuildHooks::with_parts(
        appcfg_index::ConfigFileIndex::new(layout.clone()),
        PatchRegistry::new(),
        PatchRegistry::new(),
    );
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");

    let report = hooks
        .post_build_android(&identity, &MemorySettingsStore::new())
        .unwrap();

    assert!(report.is_success());
    assert!(!layout.values_resource_path().exists());
}

#[test]
fn test_malformed_manifest_is_not_rewritten() {
    let project = FixtureProject::new();
    project.add_services_json("Firebase", &["com.example.app"]);
    let manifest = project.write_file("Assets/Plugins/Android/AndroidManifest.xml", "<manifest><oops>");
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");

    let report = hooks
        .post_build_android(&identity, &MemorySettingsStore::new())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(std::fs::read_to_string(manifest).unwrap(), "<manifest><oops>");
    assert!(hooks.layout().values_resource_path().exists());
}

#[test]
fn test_missing_identifier_is_reported() {
    let project = FixtureProject::new();
    let mut hooks = BuildHooks::new(project.layout()).unwrap();

    let err = hooks
        .post_build_android(&StaticIdentity::new(), &MemorySettingsStore::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::MissingIdentifier {
            target: BuildTarget::Android
        }
    ));
}

#[test]
fn test_ios_build_copies_config_and_registers_schemes_once() {
    let project = FixtureProject::new();
    project.add_services_plist("Firebase", "com.example.ios");
    let native_root = NormalizedPath::new(project.mkdir("Builds/iOS"));
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Ios, "com.example.ios");
    let mut store = MemorySettingsStore::new();
    save_from(&mut store, &AuthSettings { enabled: true }).unwrap();
    save_from(
        &mut store,
        &DynamicLinksSettings {
            enabled: true,
            custom_scheme: None,
            domain: Some("example.page.link".into()),
        },
    )
    .unwrap();

    let first = hooks.post_build_ios(&native_root, &identity, &store).unwrap();
    hooks.post_build_ios(&native_root, &identity, &store).unwrap();

    assert!(first.is_success(), "{first:?}");
    assert_eq!(first.file_references, vec!["GoogleService-Info.plist".to_string()]);
    assert!(native_root.join("GoogleService-Info.plist").is_file());

    let layout = hooks.layout().clone();
    let info = PlistDocument::load(&layout.info_plist_in(&native_root)).unwrap();
    let schemes: Vec<&str> = info
        .get("CFBundleURLTypes")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(Value::as_dictionary)
        .filter_map(|t| t.get("CFBundleURLSchemes").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_string)
        .collect();
    assert_eq!(schemes, vec!["com.example.apps.abc-123", "com.example.ios"]);

    let entitlements = PlistDocument::load(&layout.entitlements_in(&native_root)).unwrap();
    let domains = entitlements
        .get("com.apple.developer.associated-domains")
        .and_then(Value::as_array)
        .unwrap();
    assert_eq!(domains.len(), 1);
}

#[test]
fn test_ios_build_keeps_manual_info_values() {
    let project = FixtureProject::new();
    project.add_services_plist("Firebase", "com.example.ios");
    project.write_file(
        "Builds/iOS/Info.plist",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>FIREBASE_ANALYTICS_COLLECTION_ENABLED</key>
    <false/>
</dict>
</plist>
"#,
    );
    let native_root = NormalizedPath::new(project.root()).join("Builds/iOS");
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Ios, "com.example.ios");

    hooks
        .post_build_ios(&native_root, &identity, &MemorySettingsStore::new())
        .unwrap();

    let info = PlistDocument::load(&hooks.layout().info_plist_in(&native_root)).unwrap();
    assert_eq!(
        info.get("FIREBASE_ANALYTICS_COLLECTION_ENABLED"),
        Some(&Value::Boolean(false))
    );
    assert_eq!(
        info.get("FirebaseCrashlyticsCollectionEnabled"),
        Some(&Value::Boolean(true))
    );
}

#[test]
fn test_desktop_build_converts_property_list_config() {
    let project = FixtureProject::new();
    project.add_services_plist("Firebase", "com.example.desktop");
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let mut identity = StaticIdentity::new().with(BuildTarget::Desktop, "com.example.desktop");

    let report = hooks.pre_build(BuildTarget::Desktop, &mut identity, &mut NoPrompt).unwrap();

    let written = report.desktop_config.unwrap();
    let json: serde_json::Value = serde_json::from_str(&read(&written)).unwrap();
    assert_eq!(
        json["client"][0]["client_info"]["android_client_info"]["package_name"],
        "com.example.desktop"
    );
    assert_eq!(json["project_info"]["project_id"], "demo-project");
}

#[test]
fn test_layout_override_moves_assets_root() {
    let project = FixtureProject::new();
    project.write_file(".appcfg/layout.toml", "assets_root = \"Content\"\n");
    project.write_file(
        "Content/Firebase/google-services.json",
        &appcfg_test_utils::services_json(&["com.example.app"]),
    );
    project.add_services_json("Ignored", &["com.example.ignored"]);

    let mut hooks = BuildHooks::open(project.root()).unwrap();
    hooks.on_tick();

    let paths: Vec<&str> = hooks.index().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("Content/Firebase/google-services.json"));
}

#[test]
fn test_settings_persist_at_layout_settings_path() {
    let project = FixtureProject::new();
    project.write_file(".appcfg/layout.toml", "settings = \"Config/features.toml\"\n");
    project.add_services_json("Firebase", &["com.example.app"]);
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");

    let hooks = BuildHooks::open(project.root()).unwrap();
    let mut store = hooks.open_settings().unwrap();
    save_from(
        &mut store,
        &MessagingSettings {
            enabled: true,
            default_channel_id: Some("news".into()),
            ..MessagingSettings::default()
        },
    )
    .unwrap();
    store.flush().unwrap();
    assert!(project.root().join("Config/features.toml").is_file());

    let mut hooks = BuildHooks::open(project.root()).unwrap();
    let reopened = hooks.open_settings().unwrap();
    let report = hooks.post_build_android(&identity, &reopened).unwrap();

    assert!(report.is_success(), "{report:?}");
    let manifest = XmlDocument::load(&hooks.layout().manifest_path()).unwrap();
    assert_eq!(
        get_value(
            &manifest,
            "com.google.firebase.messaging.default_notification_channel_id"
        ),
        Some("news")
    );
}

#[test]
fn test_unwritable_manifest_aborts_only_the_manifest() {
    let project = FixtureProject::new();
    project.add_services_json("Firebase", &["com.example.app"]);
    project.mkdir("Assets/Plugins/Android/AndroidManifest.xml");
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Android, "com.example.app");

    let report = hooks
        .post_build_android(&identity, &MemorySettingsStore::new())
        .unwrap();

    let layout = hooks.layout().clone();
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].artifact, layout.manifest_path());
    assert!(report.patches.is_success());
    assert_eq!(report.written, vec![layout.values_resource_path()]);
    assert!(layout.values_resource_path().is_file());
}

#[test]
fn test_failed_config_copy_still_patches_native_project() {
    let project = FixtureProject::new();
    project.add_services_plist("Firebase", "com.example.ios");
    project.mkdir("Builds/iOS/GoogleService-Info.plist");
    let native_root = NormalizedPath::new(project.root()).join("Builds/iOS");
    let mut hooks = BuildHooks::new(project.layout()).unwrap();
    let identity = StaticIdentity::new().with(BuildTarget::Ios, "com.example.ios");

    let report = hooks
        .post_build_ios(&native_root, &identity, &MemorySettingsStore::new())
        .unwrap();

    assert_eq!(report.failures.len(), 1, "{report:?}");
    assert_eq!(report.failures[0].artifact, native_root);
    assert!(report.file_references.is_empty());
    assert!(report.patches.is_success());

    let info = PlistDocument::load(&hooks.layout().info_plist_in(&native_root)).unwrap();
    assert_eq!(
        info.get("FirebaseCrashlyticsCollectionEnabled"),
        Some(&Value::Boolean(true))
    );
}
