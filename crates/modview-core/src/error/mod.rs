//! Error types and result aliases for modview operations.
//!
//! Provides a unified error type that covers profile decoding, registry
//! access, caching and configuration with actionable error messages.

use thiserror::Error;

/// Unified error type for all modview operations
#[derive(Error, Debug)]
pub enum ModviewError {
    // Profile decode errors
    #[error("Malformed profile payload: {reason}")]
    MalformedTransport { reason: String },

    #[error("Failed to load zip: {message}")]
    ArchiveUnreadable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File '{member}' not found in the zip")]
    ManifestMissing { member: String },

    #[error("Failed to parse YAML: {message}")]
    ManifestInvalid { message: String },

    // Registry errors
    #[error("{}", rate_limit_message(.retry_after))]
    RateLimited {
        endpoint: String,
        retry_after: Option<u64>,
    },

    #[error("Registry unreachable at {endpoint}: {reason}")]
    Unreachable {
        endpoint: String,
        status: Option<u16>,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Please enter a profile identifier")]
    InvalidIdentifier,

    #[error("Mod name '{name}' is not in '<namespace>-<package>' form")]
    InvalidPackageName { name: String },

    // Cache errors
    #[error("Cache entry for {key} is corrupt: {reason}")]
    CacheCorrupt { key: String, reason: String },

    // Config errors
    #[error("Failed to parse modview.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for modview operations
pub type ModviewResult<T> = Result<T, ModviewError>;

fn rate_limit_message(retry_after: &Option<u64>) -> String {
    format!(
        "Rate-limit hit, retry in {}s",
        retry_after.unwrap_or(DEFAULT_COOLDOWN_SECS)
    )
}

/// Cooldown assumed when the registry rate-limits without a retry hint
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

impl ModviewError {
    /// Create an unreachable error from a transport-level failure
    pub fn unreachable<E>(endpoint: impl Into<String>, reason: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unreachable {
            endpoint: endpoint.into(),
            status: None,
            reason,
            source: Some(Box::new(source)),
        }
    }

    /// Create an unreachable error for a non-success HTTP status
    pub fn http_status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Unreachable {
            endpoint: endpoint.into(),
            status: Some(status),
            reason: format!("registry returned status {}", status),
            source: None,
        }
    }

    /// Create an archive error from any error type
    pub fn archive<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ArchiveUnreadable {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ModviewError::MalformedTransport { .. } | ModviewError::ArchiveUnreadable { .. } => {
                Some("Check that the identifier belongs to an exported profile")
            },
            ModviewError::ManifestMissing { .. } | ModviewError::ManifestInvalid { .. } => {
                Some("The profile was exported by an incompatible mod manager; re-export it")
            },
            ModviewError::RateLimited { .. } => Some("Wait for the cooldown to pass and try again"),
            ModviewError::Unreachable { .. } => {
                Some("Check your internet connection and the configured relay, then try again")
            },
            ModviewError::InvalidIdentifier => Some("Pass the code shown by the mod manager after exporting"),
            ModviewError::CacheCorrupt { .. } => Some("Run 'modview cache clear' to reset the cache"),
            _ => None,
        }
    }
}
