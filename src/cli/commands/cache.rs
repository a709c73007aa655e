//! Cache command - inspect and clear the library cache

use crate::cache::{format_bytes, CacheEntryInfo, LibraryCache};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::ShmgrResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ShmgrResult<()> {
    let cache = LibraryCache::new(config.cache_root(args.cache_dir.as_deref()));

    match args.action {
        CacheAction::Path => {
            println!("{}", cache.root().display());
            Ok(())
        }
        CacheAction::List { format } => list_entries(&cache, format).await,
        CacheAction::Clear { alias, yes } => clear(&cache, alias.as_deref(), yes).await,
    }
}

async fn list_entries(cache: &LibraryCache, format: OutputFormat) -> ShmgrResult<()> {
    let entries = cache.list().await?;

    if entries.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::remark(&UiContext::detect(), "Cache is empty"),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.path.display());
            }
        }
    }

    Ok(())
}

fn print_table(entries: &[CacheEntryInfo]) {
    println!(
        "{:<24} {:<12} {:<10} {:<20}",
        style("ALIAS").bold(),
        style("VERSION").bold(),
        style("SIZE").bold(),
        style("CACHED").bold()
    );
    println!("{}", "-".repeat(68));

    let mut total = 0;
    for entry in entries {
        let cached_at = entry
            .cached_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<12} {:<10} {:<20}",
            entry.alias,
            entry.version.to_string(),
            format_bytes(entry.size_bytes),
            cached_at
        );
        total += entry.size_bytes;
    }

    println!();
    println!("Total: {} file(s), {}", entries.len(), format_bytes(total));
}

async fn clear(cache: &LibraryCache, alias: Option<&str>, yes: bool) -> ShmgrResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let target = match alias {
        Some(alias) => format!("cached versions of {}", alias),
        None => format!("the whole cache at {}", cache.root().display()),
    };

    if !ui::confirm(&ctx, &format!("Remove {}?", target), false).await? {
        ui::remark(&ctx, "Nothing removed (pass --yes to skip the prompt)");
        return Ok(());
    }

    let removed = cache.clear(alias).await?;
    ui::step_ok(&ctx, &format!("Removed {} cached library file(s)", removed));
    Ok(())
}
