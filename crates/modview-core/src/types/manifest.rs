//! Profile manifest types.
//!
//! Mirrors the document stored as `export.r2x` inside an exported profile.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PackageRef;
use crate::error::ModviewResult;

/// Decoded profile manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Display name chosen by the profile author
    #[serde(rename = "profileName")]
    pub profile_name: String,
    /// Mod manager that produced the export
    #[serde(default)]
    pub source: String,
    /// Mods in declaration order
    pub mods: Vec<ModEntry>,
}

/// A single mod selection in a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    /// Full package name, `<namespace>-<package>`
    pub name: String,
    pub enabled: bool,
    pub version: ModVersion,
}

/// Version tuple recorded for a mod
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new(profile_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            source: source.into(),
            mods: Vec::new(),
        }
    }

    /// Check if the profile lists any mods
    pub fn has_mods(&self) -> bool {
        !self.mods.is_empty()
    }
}

impl ModEntry {
    /// Create a new mod entry
    pub fn new(name: impl Into<String>, enabled: bool, version: ModVersion) -> Self {
        Self {
            name: name.into(),
            enabled,
            version,
        }
    }

    /// Split the name into its registry coordinates
    pub fn package_ref(&self) -> ModviewResult<PackageRef> {
        PackageRef::parse(&self.name)
    }
}

impl ModVersion {
    /// Create a new version tuple
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
