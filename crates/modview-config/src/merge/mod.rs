//! Configuration layering, fallback logic, and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use modview_core::error::ModviewError;
use std::collections::HashMap;
use tracing::debug;

use crate::toml::{load_from_file, validate_config, ModviewToml};
use crate::ConfigResult;

/// Project configuration file name
pub const CONFIG_FILE: &str = "modview.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "MODVIEW_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Override for the global config location
    global_path: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Built-in defaults
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project modview.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            global_path: None,
        }
    }

    /// Use an explicit global config file instead of the platform default
    pub fn with_global_path(mut self, path: Utf8PathBuf) -> Self {
        self.global_path = Some(path);
        self
    }

    /// Load and merge every configuration layer
    pub async fn load(
        &self,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<(ModviewToml, Vec<ConfigSource>)> {
        let mut sources = vec![ConfigSource::Defaults];

        let global = match self.global_config_path() {
            Some(path) if path.exists() => {
                let config = load_from_file(&path).await?;
                sources.push(ConfigSource::Global(path));
                Some(config)
            },
            _ => None,
        };

        let project = match self.find_project_config() {
            Some(path) => {
                let config = load_from_file(&path).await?;
                sources.push(ConfigSource::Project(path));
                Some(config)
            },
            None => None,
        };

        sources.extend(
            env_overrides
                .keys()
                .map(|key| ConfigSource::Environment(key.clone())),
        );
        if !cli_overrides.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let merged =
            ConfigLayering::merge_configs(global, project, &env_overrides, &cli_overrides)?;
        debug!("Loaded configuration from {:?}", sources);

        Ok((merged, sources))
    }

    /// Find modview.toml in the working directory or any parent
    pub fn find_project_config(&self) -> Option<Utf8PathBuf> {
        let mut current: Option<&Utf8Path> = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Location of the global config file
    pub fn global_config_path(&self) -> Option<Utf8PathBuf> {
        if let Some(path) = &self.global_path {
            return Some(path.clone());
        }

        let config_dir = dirs::config_dir()?;
        let config_dir = Utf8PathBuf::try_from(config_dir).ok()?;
        Some(config_dir.join("modview").join("config.toml"))
    }
}

impl ConfigLayering {
    /// Merge configuration layers; later layers win field by field.
    ///
    /// A project file replaces the global file entirely. Environment and CLI
    /// overrides then apply to individual keys.
    pub fn merge_configs(
        global_config: Option<ModviewToml>,
        project_config: Option<ModviewToml>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<ModviewToml> {
        let mut merged = match (global_config, project_config) {
            (_, Some(project)) => project,
            (Some(global), None) => global,
            (None, None) => ModviewToml::default(),
        };

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        validate_config(&merged)?;

        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut ModviewToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "MODVIEW_REGISTRY_URL" => config.registry.url = value.clone(),
                "MODVIEW_RELAY" => config.registry.relay = value.clone(),
                "MODVIEW_TOKEN" => config.registry.token = Some(value.clone()),
                "MODVIEW_FETCH_INTERVAL_MS" => {
                    config.fetch.interval_ms = parse_number(key, value)?;
                },
                "MODVIEW_COOLDOWN_SECS" => {
                    config.fetch.cooldown_secs = parse_number(key, value)?;
                },
                "MODVIEW_TIMEOUT_SECS" => {
                    config.fetch.timeout_secs = parse_number(key, value)?;
                },
                "MODVIEW_CACHE_PATH" => config.cache.path = Some(Utf8PathBuf::from(value)),
                "MODVIEW_CACHE_TTL_SECS" => {
                    config.cache.ttl_secs = parse_number(key, value)?;
                },
                "MODVIEW_CACHE_ENABLED" => {
                    config.cache.enabled = parse_bool(key, value)?;
                },
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut ModviewToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "registry" => config.registry.url = value.clone(),
                "relay" => config.registry.relay = value.clone(),
                "token" => config.registry.token = Some(value.clone()),
                _ => {
                    // Unknown CLI override, ignore
                },
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn parse_number(field: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse().map_err(|e| ModviewError::ConfigValidation {
        field: field.to_string(),
        reason: format!("'{}' is not a number: {}", value, e),
    })
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ModviewError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}
