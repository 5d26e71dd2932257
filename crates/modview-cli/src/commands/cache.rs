//! `modview cache` command implementation.

use modview_core::error::ModviewResult;

use super::CommandContext;
use crate::CacheAction;

/// Execute a `modview cache` subcommand against the persistent cache
pub async fn execute(action: CacheAction, ctx: &CommandContext) -> ModviewResult<()> {
    let cache = ctx.open_cache(true)?;

    match action {
        CacheAction::Sweep => {
            let report = cache.sweep()?;
            if report.invalidated {
                ctx.output.info("Cache format changed; all entries dropped");
            }
            ctx.output.success(&format!(
                "Removed {} expired and {} excess entries, {} remaining",
                report.expired, report.evicted, report.remaining
            ));
        },
        CacheAction::Clear => {
            let count = cache.len();
            cache.clear()?;
            ctx.output.success(&format!("Removed {} cache entries", count));
        },
        CacheAction::Stats => {
            let stats = cache.stats();
            if ctx.config.cache.enabled {
                ctx.output.info(&format!("Cache file: {}", ctx.config.cache.resolve_path()?));
            } else {
                ctx.output.warn("Persistent cache is disabled");
            }
            ctx.output.line(&format!("Total:   {}", stats.total));
            ctx.output.line(&format!("Fresh:   {}", stats.fresh));
            ctx.output.line(&format!("Expired: {}", stats.expired));
        },
    }

    Ok(())
}
