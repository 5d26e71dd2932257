//! Registry package references.
//!
//! A mod name such as `BepInEx-BepInExPack` addresses a registry package by
//! namespace and package name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModviewError, ModviewResult};

/// Default registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://thunderstore.io/";

/// Default CORS-forwarding relay prefix, prepended to every request URL
pub const DEFAULT_RELAY: &str = "https://corsproxy.io/?url=";

/// Namespace/name pair identifying a registry package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub namespace: String,
    pub name: String,
}

impl PackageRef {
    /// Create a package reference from its parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse a full mod name.
    ///
    /// Splits on the first hyphen, so `A-B-C` yields namespace `A` and
    /// name `B-C`. Registry names that carry a hyphen in the namespace
    /// will resolve to the wrong package.
    pub fn parse(full_name: &str) -> ModviewResult<Self> {
        match full_name.split_once('-') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            },
            _ => Err(ModviewError::InvalidPackageName {
                name: full_name.to_string(),
            }),
        }
    }
}

impl FromStr for PackageRef {
    type Err = ModviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.name)
    }
}
