//! Package registry API response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Package metadata response from the registry's package endpoint.
///
/// Only the fields used for enrichment are typed; everything else is kept
/// in `extra` so cached responses serialize back to what the registry sent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PackageMetadata {
    /// Package namespace (team)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `<namespace>-<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Whether the package is flagged deprecated
    #[serde(default)]
    pub is_deprecated: bool,
    /// Latest published version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<LatestVersion>,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Latest version block of a package response
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LatestVersion {
    /// Version string, e.g. "5.4.2100"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Remaining version fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageMetadata {
    /// Icon URL of the latest version, if any
    pub fn icon(&self) -> Option<&str> {
        self.latest
            .as_ref()
            .and_then(|latest| latest.icon.as_deref())
            .filter(|icon| !icon.is_empty())
    }
}
