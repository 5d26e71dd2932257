//! `modview show` command implementation.
//!
//! Fetches a profile, prints its header and mod list, and fills in registry
//! metadata for each mod as it arrives.

use camino::Utf8PathBuf;
use modview_core::error::ModviewResult;
use modview_core::ModEntry;
use modview_registry::PackageMetadata;
use modview_resolver::{EnrichmentEvent, Enricher, ProfileResolver, ResolvedProfile};
use tracing::warn;

use super::CommandContext;
use crate::output::colors::ColorSupport;

/// Arguments for `modview show`
#[derive(Debug, Clone)]
pub struct ShowArgs {
    pub identifier: String,
    pub save: Option<Utf8PathBuf>,
    pub no_enrich: bool,
    pub no_cache: bool,
}

/// Execute the `modview show` command
pub async fn execute(args: ShowArgs, ctx: &CommandContext) -> ModviewResult<()> {
    let client = ctx.registry_client()?;

    ctx.output.step("🔍", "Fetching profile...");
    let profile = ProfileResolver::new(client.clone())
        .fetch_profile(&args.identifier)
        .await?;

    let colors = ctx.output.colors();
    for line in format_profile_header(&profile, colors) {
        ctx.output.line(&line);
    }

    if let Some(dir) = &args.save {
        let path = profile.save_archive(&ctx.cwd.join(dir)).await?;
        ctx.output.success(&format!("Saved archive to {}", path));
    }

    if !profile.manifest.has_mods() {
        ctx.output.line("No mods found.");
        ctx.output.success("Profile fetched successfully.");
        return Ok(());
    }

    let mods = &profile.manifest.mods;
    ctx.output.line(&format!("Mods ({}):", mods.len()));

    if args.no_enrich {
        for entry in mods {
            print_mod(ctx, &format_mod(entry, None, colors));
        }
    } else {
        let cache = ctx.open_cache(!args.no_cache)?;
        if let Err(e) = cache.sweep() {
            warn!("Cache sweep failed: {}", e);
        }

        let enricher = Enricher::new(client, cache).with_interval(ctx.config.fetch.interval());
        let mut events = enricher.stream(mods.clone());
        let mut skipped = 0;

        while let Some(event) = events.recv().await {
            let lines = match &event {
                EnrichmentEvent::Enriched(enriched) => {
                    format_mod(&enriched.entry, Some(&enriched.metadata), colors)
                },
                EnrichmentEvent::Skipped { entry, .. } => {
                    skipped += 1;
                    format_mod(entry, None, colors)
                },
            };
            print_mod(ctx, &lines);
        }

        if skipped > 0 {
            ctx.output.warn(&format!(
                "Registry details unavailable for {} of {} mods",
                skipped,
                mods.len()
            ));
        }
    }

    ctx.output.success("Profile fetched successfully.");
    Ok(())
}

fn print_mod(ctx: &CommandContext, lines: &[String]) {
    ctx.output.line("");
    for line in lines {
        ctx.output.line(line);
    }
}

/// Identifier, source and profile name
pub fn format_profile_header(profile: &ResolvedProfile, colors: &ColorSupport) -> Vec<String> {
    let mut lines = vec![format!("Uuid: {}", profile.identifier)];
    if !profile.manifest.source.is_empty() {
        lines.push(format!("From: {}", profile.manifest.source));
    }
    lines.push(colors.bold(&profile.manifest.profile_name));
    lines.push(String::new());
    lines
}

/// One mod block; metadata adds the icon and deprecation lines
pub fn format_mod(
    entry: &ModEntry,
    metadata: Option<&PackageMetadata>,
    colors: &ColorSupport,
) -> Vec<String> {
    let name = if entry.enabled {
        colors.bold(&entry.name)
    } else {
        colors.dim(&entry.name)
    };

    let mut lines = vec![
        name,
        format!("  Enabled: {}", if entry.enabled { "Yes" } else { "No" }),
        format!("  Version: {}", entry.version),
    ];

    if let Some(metadata) = metadata {
        if let Some(icon) = metadata.icon() {
            lines.push(format!("  Icon: {}", icon));
        }
        if metadata.is_deprecated {
            lines.push(format!("  {} Yes", colors.yellow("Deprecated:")));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use modview_core::{Manifest, ModVersion};

    fn metadata(deprecated: bool, icon: Option<&str>) -> PackageMetadata {
        serde_json::from_value(serde_json::json!({
            "is_deprecated": deprecated,
            "latest": { "icon": icon }
        }))
        .unwrap()
    }

    #[test]
    fn test_format_mod_without_metadata() {
        let entry = ModEntry::new("Author-ModA", true, ModVersion::new(1, 2, 3));
        let lines = format_mod(&entry, None, &ColorSupport::disabled());

        assert_eq!(
            lines,
            vec!["Author-ModA", "  Enabled: Yes", "  Version: 1.2.3"]
        );
    }

    #[test]
    fn test_format_mod_with_icon_and_deprecation() {
        let entry = ModEntry::new("Author-ModA", true, ModVersion::new(1, 0, 0));
        let meta = metadata(true, Some("https://cdn.example.com/a.png"));
        let lines = format_mod(&entry, Some(&meta), &ColorSupport::disabled());

        assert_eq!(lines[3], "  Icon: https://cdn.example.com/a.png");
        assert_eq!(lines[4], "  Deprecated: Yes");
    }

    #[test]
    fn test_format_mod_without_icon() {
        let entry = ModEntry::new("Author-ModA", true, ModVersion::new(1, 0, 0));
        let meta = metadata(false, None);
        let lines = format_mod(&entry, Some(&meta), &ColorSupport::disabled());

        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_disabled_mod_is_dimmed() {
        let entry = ModEntry::new("Author-ModA", false, ModVersion::new(1, 0, 0));
        let lines = format_mod(&entry, None, &ColorSupport::enabled());

        assert_eq!(lines[0], "\x1b[2mAuthor-ModA\x1b[0m");
        assert_eq!(lines[1], "  Enabled: No");
    }

    #[test]
    fn test_profile_header() {
        let profile = ResolvedProfile {
            identifier: "abc123".to_string(),
            manifest: Manifest::new("Test", "r2modman"),
            archive: Vec::new(),
        };

        let lines = format_profile_header(&profile, &ColorSupport::disabled());
        assert_eq!(lines, vec!["Uuid: abc123", "From: r2modman", "Test", ""]);
    }
}
