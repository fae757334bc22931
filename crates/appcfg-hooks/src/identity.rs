//! Build targets and the application identifiers the host assigns them

use std::collections::BTreeMap;
use std::fmt;

use appcfg_index::ConfigFileType;

/// Platform a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildTarget {
    Android,
    Ios,
    Desktop,
}

impl BuildTarget {
    pub const ALL: [BuildTarget; 3] = [Self::Android, Self::Ios, Self::Desktop];

    /// Config file type the target consumes.
    pub fn config_type(self) -> ConfigFileType {
        match self {
            Self::Android | Self::Desktop => ConfigFileType::StructuredText,
            Self::Ios => ConfigFileType::PropertyList,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-target application identifiers owned by the host build settings.
///
/// Only interactive resolution calls [`set_identifier`](Self::set_identifier).
pub trait ApplicationIdentity {
    fn identifier(&self, target: BuildTarget) -> Option<String>;
    fn set_identifier(&mut self, target: BuildTarget, identifier: &str);
}

/// Identifiers held in memory, for hosts without their own settings object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    identifiers: BTreeMap<BuildTarget, String>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: BuildTarget, identifier: impl Into<String>) -> Self {
        self.identifiers.insert(target, identifier.into());
        self
    }
}

impl ApplicationIdentity for StaticIdentity {
    fn identifier(&self, target: BuildTarget) -> Option<String> {
        self.identifiers.get(&target).cloned()
    }

    fn set_identifier(&mut self, target: BuildTarget, identifier: &str) {
        tracing::info!(%target, identifier, "Application identifier updated");
        self.identifiers.insert(target, identifier.to_string());
    }
}
