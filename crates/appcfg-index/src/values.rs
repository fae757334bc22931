//! Android string resources derived from the structured-text config

use appcfg_doc::{XmlDocument, XmlElement};
use appcfg_fs::{NormalizedPath, ProjectLayout, io};

use crate::error::{Error, Result};
use crate::model::{ConfigFile, ConfigFileType, ConfigIndex};
use crate::oracle::{ServicesFileParser, ServicesJson};
use crate::resolver::{ConfigResolver, ResolveMode};

const TOOLS_NS: &str = "http://schemas.android.com/tools";

/// Render the `<resources>` document for `package_name`.
///
/// Empty values are left out so the runtime falls back to its defaults.
pub fn generate_values_resource(
    json: &ServicesJson,
    package_name: &str,
    origin: &NormalizedPath,
) -> Result<XmlDocument> {
    let client = json
        .client_for(package_name)
        .ok_or_else(|| Error::NoMatchingClient {
            path: origin.to_native(),
            package_name: package_name.to_string(),
        })?;

    let project = &json.project_info;
    let api_key = client.api_key().unwrap_or_default();
    let entries = [
        ("google_app_id", client.client_info.mobilesdk_app_id.as_str()),
        ("gcm_defaultSenderId", project.project_number.as_str()),
        ("google_api_key", api_key),
        ("google_crash_reporting_api_key", api_key),
        ("project_id", project.project_id.as_str()),
        ("google_storage_bucket", project.storage_bucket.as_str()),
        ("firebase_database_url", project.firebase_url.as_str()),
        ("default_web_client_id", client.web_client_id().unwrap_or_default()),
    ];

    let kept: Vec<(&str, &str)> = entries.into_iter().filter(|(_, v)| !v.is_empty()).collect();
    let keep = kept
        .iter()
        .map(|(name, _)| format!("@string/{name}"))
        .collect::<Vec<_>>()
        .join(",");

    let mut root = XmlElement::new("resources").with_attr("xmlns:tools", TOOLS_NS);
    if !keep.is_empty() {
        root.set_attr("tools:keep", keep);
    }
    for (name, value) in kept {
        root.push(
            XmlElement::new("string")
                .with_attr("name", name)
                .with_attr("translatable", "false")
                .with_text(value),
        );
    }
    Ok(XmlDocument::new(root))
}

/// Generate the values resource for `package_name` from the matching config.
///
/// Returns the written path, or `None` when no structured-text config serves
/// the package.
pub fn write_values_resource(
    index: &ConfigIndex,
    layout: &ProjectLayout,
    package_name: &str,
) -> Result<Option<NormalizedPath>> {
    let resolution =
        ConfigResolver::new(index).resolve(ConfigFileType::StructuredText, package_name, ResolveMode::MatchOnly);
    let Some(ConfigFile { path, .. }) = resolution.into_selected() else {
        tracing::debug!(package = package_name, "No structured-text config for package");
        return Ok(None);
    };

    let json = ServicesFileParser::new().parse_json(&path)?;
    let document = generate_values_resource(&json, package_name, &path)?;
    let destination = layout.values_resource_path();
    if io::write_text_if_changed(&destination, &document.to_xml_string()?)? {
        tracing::info!(source = %path, path = %destination, "Wrote values resource");
    }
    Ok(Some(destination))
}
