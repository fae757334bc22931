//! Identifier extraction from config files

use serde::{Deserialize, Serialize};

use appcfg_doc::PlistDocument;
use appcfg_fs::{NormalizedPath, io};

use crate::error::{Error, Result};
use crate::model::ConfigFileType;

/// Property-list key holding the bundle identifier.
pub const BUNDLE_ID_KEY: &str = "BUNDLE_ID";

/// Answers which application identifiers a config file serves.
///
/// An `Err` means the file is unreadable or malformed; the index skips it.
pub trait IdentifierOracle {
    fn list_identifiers(
        &self,
        path: &NormalizedPath,
        file_type: ConfigFileType,
    ) -> Result<Vec<String>>;
}

/// In-process parser for both config encodings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServicesFileParser;

impl ServicesFileParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a structured-text config file.
    pub fn parse_json(&self, path: &NormalizedPath) -> Result<ServicesJson> {
        let content = io::read_text(path)?;
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_native(),
            source,
        })
    }

    /// Parse a property-list config file.
    pub fn parse_plist(&self, path: &NormalizedPath) -> Result<PlistDocument> {
        Ok(PlistDocument::load(path)?)
    }
}

impl IdentifierOracle for ServicesFileParser {
    fn list_identifiers(
        &self,
        path: &NormalizedPath,
        file_type: ConfigFileType,
    ) -> Result<Vec<String>> {
        match file_type {
            ConfigFileType::StructuredText => Ok(self.parse_json(path)?.package_names()),
            ConfigFileType::PropertyList => {
                let doc = self.parse_plist(path)?;
                let bundle_id = doc.string(BUNDLE_ID_KEY).ok_or_else(|| Error::MissingKey {
                    path: path.to_native(),
                    key: BUNDLE_ID_KEY.into(),
                })?;
                Ok(vec![bundle_id.to_string()])
            }
        }
    }
}

/// Typed view of a structured-text config file.
///
/// Unknown fields are ignored; missing ones default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesJson {
    pub project_info: ProjectInfo,
    pub client: Vec<Client>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub configuration_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub project_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub firebase_url: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_bucket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub client_info: ClientInfo,
    pub oauth_client: Vec<OAuthClient>,
    pub api_key: Vec<ApiKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub mobilesdk_app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_client_info: Option<AndroidClientInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidClientInfo {
    pub package_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_type: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKey {
    pub current_key: String,
}

/// OAuth client type of a web client.
pub const WEB_CLIENT_TYPE: u32 = 3;

impl Client {
    pub fn package_name(&self) -> Option<&str> {
        self.client_info
            .android_client_info
            .as_ref()
            .map(|info| info.package_name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .iter()
            .map(|k| k.current_key.as_str())
            .find(|k| !k.is_empty())
    }

    pub fn web_client_id(&self) -> Option<&str> {
        self.oauth_client
            .iter()
            .find(|c| c.client_type == WEB_CLIENT_TYPE && !c.client_id.is_empty())
            .map(|c| c.client_id.as_str())
    }
}

impl ServicesJson {
    /// Package names of every client, in file order, without duplicates.
    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.client.iter().filter_map(Client::package_name) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn client_for(&self, package_name: &str) -> Option<&Client> {
        self.client
            .iter()
            .find(|c| c.package_name() == Some(package_name))
    }
}
