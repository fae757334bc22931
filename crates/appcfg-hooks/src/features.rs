//! Built-in features and their patch callbacks
//!
//! Each feature owns a settings type persisted in the settings store and
//! contributes callbacks to the manifest registry, the native-project
//! registry, or both.

use plist::Value;
use serde::{Deserialize, Serialize};

use appcfg_patch::{
    Error as PatchError, FeatureId, FeatureSettings, ManifestTarget, NativeProjectTarget,
    PatchRegistry,
};

use crate::error::Result;

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Settings shared by every feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub data_collection_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_collection_enabled: true,
        }
    }
}

impl FeatureSettings for AppSettings {
    const FEATURE: FeatureId = FeatureId::App;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub collection_enabled: bool,
    pub ad_id_collection_enabled: bool,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            collection_enabled: true,
            ad_id_collection_enabled: true,
        }
    }
}

impl FeatureSettings for AnalyticsSettings {
    const FEATURE: FeatureId = FeatureId::Analytics;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Register the reversed client id as a URL scheme for sign-in redirects
    pub enabled: bool,
}

impl FeatureSettings for AuthSettings {
    const FEATURE: FeatureId = FeatureId::Auth;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashlyticsSettings {
    pub collection_enabled: bool,
}

impl Default for CrashlyticsSettings {
    fn default() -> Self {
        Self {
            collection_enabled: true,
        }
    }
}

impl FeatureSettings for CrashlyticsSettings {
    const FEATURE: FeatureId = FeatureId::Crashlytics;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicLinksSettings {
    pub enabled: bool,
    /// URL scheme to register; the bundle id when unset
    pub custom_scheme: Option<String>,
    /// Associated domain, e.g. `example.page.link`
    pub domain: Option<String>,
}

impl FeatureSettings for DynamicLinksSettings {
    const FEATURE: FeatureId = FeatureId::DynamicLinks;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingSettings {
    pub enabled: bool,
    pub auto_init_enabled: bool,
    pub default_channel_id: Option<String>,
    /// Drawable resource name for notifications
    pub default_icon: Option<String>,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            auto_init_enabled: true,
            default_channel_id: None,
            default_icon: None,
        }
    }
}

impl FeatureSettings for MessagingSettings {
    const FEATURE: FeatureId = FeatureId::Messaging;
}

const MESSAGING_CHANNEL_KEY: &str = "com.google.firebase.messaging.default_notification_channel_id";
const MESSAGING_ICON_KEY: &str = "com.google.firebase.messaging.default_notification_icon";
const ASSOCIATED_DOMAINS: &str = "com.apple.developer.associated-domains";

/// Manifest registry with every built-in feature.
pub fn builtin_manifest_registry() -> Result<PatchRegistry<ManifestTarget>> {
    let mut registry: PatchRegistry<ManifestTarget> = PatchRegistry::new();

    registry.register::<AppSettings, _>(|manifest, s| {
        manifest.set_value(
            "firebase_data_collection_default_enabled",
            flag(s.data_collection_enabled),
        );
        Ok(())
    })?;

    registry.register::<AnalyticsSettings, _>(|manifest, s| {
        manifest.set_value("firebase_analytics_collection_enabled", flag(s.collection_enabled));
        manifest.set_value(
            "google_analytics_adid_collection_enabled",
            flag(s.ad_id_collection_enabled),
        );
        Ok(())
    })?;

    registry.register::<CrashlyticsSettings, _>(|manifest, s| {
        manifest.set_value("firebase_crashlytics_collection_enabled", flag(s.collection_enabled));
        Ok(())
    })?;

    registry.register::<MessagingSettings, _>(|manifest, s| {
        if !s.enabled {
            return Ok(());
        }
        manifest.add_permission("android.permission.POST_NOTIFICATIONS");
        manifest.set_value("firebase_messaging_auto_init_enabled", flag(s.auto_init_enabled));
        match &s.default_channel_id {
            Some(channel) => {
                manifest.set_value(MESSAGING_CHANNEL_KEY, channel);
            }
            None => {
                manifest.delete_key(MESSAGING_CHANNEL_KEY);
            }
        }
        match &s.default_icon {
            Some(icon) => {
                manifest.set_resource(MESSAGING_ICON_KEY, &format!("@drawable/{icon}"));
            }
            None => {
                manifest.delete_key(MESSAGING_ICON_KEY);
            }
        }
        Ok(())
    })?;

    Ok(registry)
}

/// Native-project registry with every built-in feature.
pub fn builtin_native_registry() -> Result<PatchRegistry<NativeProjectTarget>> {
    let mut registry: PatchRegistry<NativeProjectTarget> = PatchRegistry::new();

    registry.register::<AppSettings, _>(|project, s| {
        project.set_info_if_absent(
            "FirebaseDataCollectionDefaultEnabled",
            s.data_collection_enabled,
        );
        Ok(())
    })?;

    registry.register::<AnalyticsSettings, _>(|project, s| {
        project.set_info_if_absent("FIREBASE_ANALYTICS_COLLECTION_ENABLED", s.collection_enabled);
        project.set_info_if_absent(
            "GOOGLE_ANALYTICS_IDFV_COLLECTION_ENABLED",
            s.ad_id_collection_enabled,
        );
        Ok(())
    })?;

    registry.register::<AuthSettings, _>(|project, s| {
        if !s.enabled {
            return Ok(());
        }
        let scheme = project
            .config_value("REVERSED_CLIENT_ID")
            .map(str::to_string)
            .ok_or_else(|| PatchError::Feature {
                feature: FeatureId::Auth,
                message: "config has no REVERSED_CLIENT_ID".into(),
            })?;
        project.register_url_scheme("google-sign-in", &scheme);
        Ok(())
    })?;

    registry.register::<CrashlyticsSettings, _>(|project, s| {
        project.set_info_if_absent("FirebaseCrashlyticsCollectionEnabled", s.collection_enabled);
        Ok(())
    })?;

    registry.register::<DynamicLinksSettings, _>(|project, s| {
        if !s.enabled {
            return Ok(());
        }
        let scheme = match &s.custom_scheme {
            Some(scheme) => scheme.clone(),
            None => project
                .config_value("BUNDLE_ID")
                .map(str::to_string)
                .ok_or_else(|| PatchError::Feature {
                    feature: FeatureId::DynamicLinks,
                    message: "no custom scheme and config has no BUNDLE_ID".into(),
                })?,
        };
        project.register_url_scheme("dynamic-links", &scheme);
        if let Some(domain) = &s.domain {
            project.set_entitlement_if_absent(
                ASSOCIATED_DOMAINS,
                Value::Array(vec![Value::String(format!("applinks:{domain}"))]),
            );
        }
        Ok(())
    })?;

    registry.register::<MessagingSettings, _>(|project, s| {
        if !s.enabled {
            return Ok(());
        }
        project.add_background_mode("remote-notification");
        project.set_entitlement_if_absent("aps-environment", "development");
        project.set_info_if_absent("FirebaseMessagingAutoInitEnabled", s.auto_init_enabled);
        Ok(())
    })?;

    Ok(registry)
}
