//! # modview-cli
//!
//! Command-line viewer for shared mod profiles.
//!
//! This is the main entry point for the modview CLI tool. It handles command parsing,
//! sets up logging and error handling, and dispatches to the appropriate command handlers.

use clap::{Parser, Subcommand};
use modview_core::error::{ModviewError, ModviewResult};
use std::collections::HashMap;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Inspect shared mod profiles and the mods they contain
#[derive(Parser)]
#[command(name = "modview", version, about = "Inspect shared mod profiles")]
#[command(allow_external_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Relay prefix requests are sent through; empty for direct access
    #[arg(long, global = true, value_name = "URL")]
    pub relay: Option<String>,

    /// Access token forwarded with every request
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Registry base URL
    #[arg(long, global = true, value_name = "URL")]
    pub registry: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and display a profile
    Show {
        /// Profile identifier
        identifier: String,
        /// Save the profile archive into this directory
        #[arg(long, value_name = "DIR")]
        save: Option<String>,
        /// Skip registry metadata
        #[arg(long)]
        no_enrich: bool,
        /// Keep enrichment results in memory only
        #[arg(long)]
        no_cache: bool,
    },
    /// Manage the enrichment cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show version information
    Version,
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Drop expired entries, or everything after a format change
    Sweep,
    /// Remove every entry
    Clear,
    /// Show entry counts
    Stats,
}

impl Cli {
    /// Flags that override configuration values
    fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(relay) = &self.relay {
            overrides.insert("relay".to_string(), relay.clone());
        }
        if let Some(token) = &self.token {
            overrides.insert("token".to_string(), token.clone());
        }
        if let Some(registry) = &self.registry {
            overrides.insert("registry".to_string(), registry.clone());
        }
        overrides
    }
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_json);
    setup_panic_handler();

    debug!("Starting modview v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_cli(cli) {
        eprintln!("{}", ErrorFormatter::new().format_error(&e));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> ModviewResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().map_err(|e| ModviewError::Io {
        message: "Failed to create async runtime".to_string(),
        source: e,
    })?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.config_overrides()).await?;

        match cli.command {
            Some(command) => commands::dispatch_command(command, &ctx).await,
            None => commands::show_help(&ctx).await,
        }
    })
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("modview={}", level)));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("modview encountered an unexpected error: {}", panic_info);
        eprintln!("modview crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/modview/modview/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
