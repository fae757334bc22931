//! Desktop config bootstrap
//!
//! Desktop builds read a structured-text config from streaming assets. It is
//! copied from a matching structured-text file when one exists, otherwise
//! converted from a property-list file.

use appcfg_doc::PlistDocument;
use appcfg_fs::{NormalizedPath, ProjectLayout, io};

use crate::error::{Error, Result};
use crate::model::{ConfigFileType, ConfigIndex};
use crate::oracle::{
    AndroidClientInfo, ApiKey, BUNDLE_ID_KEY, Client, ClientInfo, OAuthClient, ProjectInfo,
    ServicesFileParser, ServicesJson, WEB_CLIENT_TYPE,
};
use crate::resolver::{ConfigResolver, ResolveMode};

/// Write the desktop config for `wanted_id`.
///
/// Returns the written path, or `None` when the project has no config file
/// at all. The file is only rewritten when its content changes.
pub fn write_desktop_config(
    index: &ConfigIndex,
    layout: &ProjectLayout,
    wanted_id: &str,
) -> Result<Option<NormalizedPath>> {
    let parser = ServicesFileParser::new();
    let destination = layout.desktop_config_path();

    let content = if let Some(file) = pick(index, ConfigFileType::StructuredText, wanted_id) {
        // Parse first so a malformed source never reaches the desktop build
        parser.parse_json(&file)?;
        io::read_text(&file)?
    } else if let Some(file) = pick(index, ConfigFileType::PropertyList, wanted_id) {
        let converted = convert_plist(&parser.parse_plist(&file)?, &file)?;
        serde_json::to_string_pretty(&converted).map_err(|source| Error::Json {
            path: file.to_native(),
            source,
        })?
    } else {
        tracing::warn!(
            identifier = wanted_id,
            "No config file found, desktop config not generated"
        );
        return Ok(None);
    };

    if io::write_text_if_changed(&destination, &content)? {
        tracing::info!(path = %destination, "Wrote desktop config");
    }
    Ok(Some(destination))
}

fn pick(index: &ConfigIndex, file_type: ConfigFileType, wanted_id: &str) -> Option<NormalizedPath> {
    let resolver = ConfigResolver::new(index);
    let resolution = match resolver.resolve(file_type, wanted_id, ResolveMode::MatchOnly) {
        r if r.is_not_found() => resolver.resolve(file_type, wanted_id, ResolveMode::ReturnAll),
        r => r,
    };
    resolution.into_selected().map(|f| f.path)
}

/// Map property-list keys onto the structured-text schema.
pub fn convert_plist(doc: &PlistDocument, origin: &NormalizedPath) -> Result<ServicesJson> {
    let get = |key: &str| doc.string(key).unwrap_or_default().to_string();

    let bundle_id = doc.string(BUNDLE_ID_KEY).ok_or_else(|| Error::MissingKey {
        path: origin.to_native(),
        key: BUNDLE_ID_KEY.into(),
    })?;

    let mut client = Client {
        client_info: ClientInfo {
            mobilesdk_app_id: get("GOOGLE_APP_ID"),
            android_client_info: Some(AndroidClientInfo {
                package_name: bundle_id.to_string(),
            }),
        },
        ..Client::default()
    };
    if let Some(key) = doc.string("API_KEY") {
        client.api_key.push(ApiKey {
            current_key: key.to_string(),
        });
    }
    if let Some(id) = doc.string("CLIENT_ID") {
        client.oauth_client.push(OAuthClient {
            client_id: id.to_string(),
            client_type: WEB_CLIENT_TYPE,
        });
    }

    Ok(ServicesJson {
        project_info: ProjectInfo {
            project_number: get("GCM_SENDER_ID"),
            firebase_url: get("DATABASE_URL"),
            project_id: get("PROJECT_ID"),
            storage_bucket: get("STORAGE_BUCKET"),
        },
        client: vec![client],
        configuration_version: "1".into(),
    })
}
