//! Command implementations and dispatch logic.
//!
//! Each command is implemented as an async function that takes a CommandContext.

use camino::Utf8PathBuf;
use modview_config::{ConfigLayering, ConfigLoader, ModviewToml};
use modview_core::error::{ModviewError, ModviewResult};
use modview_registry::{ClientConfig, EnrichmentCache, RateLimitConfig, RegistryClient};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub mod cache;
pub mod show;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub config: ModviewToml,
}

impl CommandContext {
    /// Create a command context, loading configuration for the working directory
    pub async fn new(cli_overrides: HashMap<String, String>) -> ModviewResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| ModviewError::Io {
            message: "Failed to get current directory".to_string(),
            source: e,
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| ModviewError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("Working directory is not valid UTF-8: {}", path.display()),
        })?;

        let (config, sources) = ConfigLoader::new(cwd.clone())
            .load(ConfigLayering::collect_env_overrides(), cli_overrides)
            .await?;
        debug!("Configuration sources: {:?}", sources);

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            config,
        })
    }

    /// Registry client built from the loaded configuration
    pub fn registry_client(&self) -> ModviewResult<Arc<RegistryClient>> {
        let client = RegistryClient::with_config(ClientConfig {
            registry_url: self.config.registry.url.clone(),
            relay: self.config.registry.relay.clone(),
            token: self.config.registry.token.clone(),
            timeout: self.config.fetch.timeout(),
            rate_limit: RateLimitConfig {
                cooldown: self.config.fetch.cooldown(),
            },
        })?;
        Ok(Arc::new(client))
    }

    /// Open the enrichment cache.
    ///
    /// Falls back to an in-memory cache when persistence is disabled in the
    /// configuration or `persistent` is false.
    pub fn open_cache(&self, persistent: bool) -> ModviewResult<Arc<EnrichmentCache>> {
        let cache = if persistent && self.config.cache.enabled {
            let path = self.config.cache.resolve_path()?;
            debug!("Using cache file {}", path);
            EnrichmentCache::open(&path)?
        } else {
            EnrichmentCache::in_memory()
        };

        Ok(Arc::new(cache.with_ttl(self.config.cache.ttl())))
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> ModviewResult<()> {
    match command {
        Commands::Show {
            identifier,
            save,
            no_enrich,
            no_cache,
        } => {
            info!("Showing profile: {}", identifier);
            let args = show::ShowArgs {
                identifier,
                save: save.map(Utf8PathBuf::from),
                no_enrich,
                no_cache,
            };
            show::execute(args, ctx).await
        },
        Commands::Cache { action } => {
            info!("Cache action: {:?}", action);
            cache::execute(action, ctx).await
        },
        Commands::Version => show_version(ctx).await,
        Commands::External(args) => unknown_command(args, ctx),
    }
}

/// Report an unrecognised command, with a suggestion when one is close
fn unknown_command(args: Vec<String>, ctx: &CommandContext) -> ModviewResult<()> {
    let name = args.first().cloned().unwrap_or_default();

    ctx.output.error(&format!("Unknown command '{}'", name));
    if let Some(suggestion) = suggest_similar_command(&name) {
        ctx.output.info(&format!("Did you mean '{}'?", suggestion));
    }
    ctx.output.info("Run 'modview help' to see available commands.");

    Err(ModviewError::ConfigValidation {
        field: "command".to_string(),
        reason: format!("Unknown command: {}", name),
    })
}

/// Show help information
pub async fn show_help(ctx: &CommandContext) -> ModviewResult<()> {
    ctx.output.line("modview - inspect shared mod profiles");
    ctx.output.line("");
    ctx.output.line("Usage: modview [COMMAND] [OPTIONS]");
    ctx.output.line("");
    ctx.output.line("Commands:");
    ctx.output.line("  show <id>      Fetch and display a profile");
    ctx.output.line("  cache sweep    Drop expired cache entries");
    ctx.output.line("  cache clear    Remove every cache entry");
    ctx.output.line("  cache stats    Show cache entry counts");
    ctx.output.line("  version        Show version information");
    ctx.output.line("");
    ctx.output.line("Run 'modview <command> --help' for more information on a command.");
    Ok(())
}

async fn show_version(ctx: &CommandContext) -> ModviewResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build_date = env!("BUILD_DATE");
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.line(&format!("modview v{}", version));
    ctx.output.info(&format!("Built: {}", build_date));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));

    Ok(())
}

/// Suggest similar commands based on edit distance
pub fn suggest_similar_command(input: &str) -> Option<String> {
    let commands = ["show", "cache", "version", "help"];

    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for &command in &commands {
        let distance = edit_distance(input, command);
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(command);
        }
    }

    best_match.map(|s| s.to_string())
}

/// Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}
