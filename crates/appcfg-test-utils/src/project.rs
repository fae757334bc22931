//! Temporary host projects for tests.

use std::fs;
use std::path::{Path, PathBuf};

use appcfg_fs::ProjectLayout;
use tempfile::TempDir;

/// Structured-text config content serving `package_names`.
///
/// Every client shares one project; app ids are derived from the index.
pub fn services_json(package_names: &[&str]) -> String {
    let clients: Vec<String> = package_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"{{
      "client_info": {{
        "mobilesdk_app_id": "1:1234567890:android:{i:04}",
        "android_client_info": {{ "package_name": "{name}" }}
      }},
      "oauth_client": [
        {{ "client_id": "web-{i}.apps.example.com", "client_type": 3 }}
      ],
      "api_key": [ {{ "current_key": "key-{i}" }} ]
    }}"#
            )
        })
        .collect();

    format!(
        r#"{{
  "project_info": {{
    "project_number": "1234567890",
    "firebase_url": "https://demo.example.com",
    "project_id": "demo-project",
    "storage_bucket": "demo-project.appspot.com"
  }},
  "client": [
    {}
  ],
  "configuration_version": "1"
}}
"#,
        clients.join(",\n    ")
    )
}

/// Property-list config content for `bundle_id`.
pub fn services_plist(bundle_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>API_KEY</key>
    <string>ios-key</string>
    <key>BUNDLE_ID</key>
    <string>{bundle_id}</string>
    <key>CLIENT_ID</key>
    <string>123-abc.apps.example.com</string>
    <key>REVERSED_CLIENT_ID</key>
    <string>com.example.apps.abc-123</string>
    <key>GCM_SENDER_ID</key>
    <string>1234567890</string>
    <key>GOOGLE_APP_ID</key>
    <string>1:1234567890:ios:abcd</string>
    <key>PROJECT_ID</key>
    <string>demo-project</string>
    <key>STORAGE_BUCKET</key>
    <string>demo-project.appspot.com</string>
</dict>
</plist>
"#
    )
}

/// A host project rooted in a temporary directory.
///
/// The directory is removed when the fixture drops.
pub struct FixtureProject {
    dir: TempDir,
}

impl FixtureProject {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("FixtureProject: tempdir failed: {e}"));
        fs::create_dir_all(dir.path().join("Assets"))
            .unwrap_or_else(|e| panic!("FixtureProject: failed to create Assets: {e}"));
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(self.dir.path())
    }

    /// Write `content` at `relative`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", path.display()));
        path
    }

    /// Drop a structured-text config into `Assets/<dir>/`.
    pub fn add_services_json(&self, dir: &str, package_names: &[&str]) -> PathBuf {
        self.write_file(
            &format!("Assets/{dir}/google-services.json"),
            &services_json(package_names),
        )
    }

    /// Drop a property-list config into `Assets/<dir>/`.
    pub fn add_services_plist(&self, dir: &str, bundle_id: &str) -> PathBuf {
        self.write_file(
            &format!("Assets/{dir}/GoogleService-Info.plist"),
            &services_plist(bundle_id),
        )
    }

    /// Create an empty directory at `relative`.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("mkdir: failed to create {}: {e}", path.display()));
        path
    }
}

impl Default for FixtureProject {
    fn default() -> Self {
        Self::new()
    }
}
