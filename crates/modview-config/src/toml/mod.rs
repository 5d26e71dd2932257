//! modview.toml configuration parsing

use camino::{Utf8Path, Utf8PathBuf};
use modview_core::error::ModviewError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigResult;

use modview_core::types::{DEFAULT_REGISTRY_URL, DEFAULT_RELAY};

/// Complete modview.toml configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModviewToml {
    /// Registry and relay settings
    #[serde(default)]
    pub registry: RegistrySection,

    /// Request pacing and rate-limit settings
    #[serde(default)]
    pub fetch: FetchSection,

    /// Enrichment cache settings
    #[serde(default)]
    pub cache: CacheSection,
}

/// Registry section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Registry base URL, with trailing slash
    pub url: String,

    /// Relay prefix; the url-encoded endpoint is appended to it.
    /// Empty means requests go to the registry directly.
    pub relay: String,

    /// Access token forwarded to the relay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Fetch section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    /// Spacing before every live enrichment request
    pub interval_ms: u64,

    /// Cooldown when a 403 arrives without a retry hint
    pub cooldown_secs: u64,

    /// Per-request timeout
    pub timeout_secs: u64,
}

/// Cache section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Whether enrichment results are persisted between runs
    pub enabled: bool,

    /// Cache file location; defaults to the platform cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,

    /// Entry lifetime
    pub ttl_secs: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            relay: DEFAULT_RELAY.to_string(),
            token: None,
        }
    }
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            cooldown_secs: modview_core::error::DEFAULT_COOLDOWN_SECS,
            timeout_secs: 30,
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            ttl_secs: 3600,
        }
    }
}

impl FetchSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Resolve the cache file, falling back to `<cache_dir>/modview/enrichment.json`
    pub fn resolve_path(&self) -> ConfigResult<Utf8PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let base = dirs::cache_dir().ok_or_else(|| ModviewError::ConfigValidation {
            field: "cache.path".to_string(),
            reason: "Could not determine the platform cache directory".to_string(),
        })?;

        let base = Utf8PathBuf::try_from(base).map_err(|e| ModviewError::ConfigValidation {
            field: "cache.path".to_string(),
            reason: format!("Cache directory is not valid UTF-8: {}", e),
        })?;

        Ok(base.join("modview").join("enrichment.json"))
    }
}

/// Parse TOML string to ModviewToml configuration
pub fn parse_modview_toml(content: &str) -> ConfigResult<ModviewToml> {
    let config: ModviewToml = ::toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_column(content, span.start))
            .unwrap_or((0, 0));
        ModviewError::TomlParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &ModviewToml) -> ConfigResult<()> {
    let registry = url::Url::parse(&config.registry.url).map_err(|e| {
        ModviewError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", config.registry.url, e),
        }
    })?;

    if !registry.path().ends_with('/') {
        return Err(ModviewError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: "Registry URL must end with '/'".to_string(),
        });
    }

    if !config.registry.relay.is_empty() {
        url::Url::parse(&config.registry.relay).map_err(|e| ModviewError::ConfigValidation {
            field: "registry.relay".to_string(),
            reason: format!("'{}' is not a valid URL: {}", config.registry.relay, e),
        })?;
    }

    if config.cache.ttl_secs == 0 {
        return Err(ModviewError::ConfigValidation {
            field: "cache.ttl_secs".to_string(),
            reason: "Cache lifetime must be greater than zero".to_string(),
        });
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ModviewError::ConfigValidation {
            field: "fetch.timeout_secs".to_string(),
            reason: "Request timeout must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Load and parse modview.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ModviewToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ModviewError::io(format!("Failed to read {}", path), e))?;

    parse_modview_toml(&content).map_err(|e| match e {
        ModviewError::TomlParse { message, line, column } => ModviewError::TomlParse {
            message: format!("in file {}: {}", path, message),
            line,
            column,
        },
        other => other,
    })
}

/// 1-based line and column for a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_modview_toml("").unwrap();
        assert_eq!(config, ModviewToml::default());
        assert_eq!(config.registry.url, "https://thunderstore.io/");
        assert_eq!(config.registry.relay, "https://corsproxy.io/?url=");
        assert_eq!(config.fetch.interval(), Duration::from_millis(100));
        assert_eq!(config.fetch.cooldown(), Duration::from_secs(60));
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[registry]
url = "https://example.com/"
relay = ""
token = "secret"

[fetch]
interval_ms = 250
cooldown_secs = 30

[cache]
enabled = false
path = "/tmp/modview.json"
"#;
        let config = parse_modview_toml(toml).unwrap();
        assert_eq!(config.registry.url, "https://example.com/");
        assert_eq!(config.registry.relay, "");
        assert_eq!(config.registry.token.as_deref(), Some("secret"));
        assert_eq!(config.fetch.interval_ms, 250);
        assert_eq!(config.fetch.cooldown_secs, 30);
        // Unset keys keep their defaults
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.resolve_path().unwrap(), Utf8PathBuf::from("/tmp/modview.json"));
    }

    #[test]
    fn test_syntax_error_reports_location() {
        let result = parse_modview_toml("[fetch]\ninterval_ms = \"fast\"\n");
        match result {
            Err(ModviewError::TomlParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected TomlParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_registry_url() {
        let result = parse_modview_toml("[registry]\nurl = \"not a url\"\n");
        assert!(matches!(result, Err(ModviewError::ConfigValidation { field, .. }) if field == "registry.url"));
    }

    #[test]
    fn test_registry_url_requires_trailing_slash() {
        let result = parse_modview_toml("[registry]\nurl = \"https://example.com/api\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = parse_modview_toml("[cache]\nttl_secs = 0\n");
        assert!(matches!(result, Err(ModviewError::ConfigValidation { field, .. }) if field == "cache.ttl_secs"));
    }

    #[test]
    fn test_line_column() {
        let content = "a = 1\nbb = 2\n";
        assert_eq!(line_column(content, 0), (1, 1));
        assert_eq!(line_column(content, 6), (2, 1));
        assert_eq!(line_column(content, 9), (2, 4));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("modview.toml")).unwrap();
        tokio::fs::write(&path, "[fetch]\ninterval_ms = 5\n").await.unwrap();

        let config = load_from_file(&path).await.unwrap();
        assert_eq!(config.fetch.interval_ms, 5);
    }
}
