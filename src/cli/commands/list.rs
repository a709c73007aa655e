//! List command - show installed and cached libraries

use super::build_resolver;
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ShmgrError, ShmgrResult};
use crate::resolver::LibraryListing;
use crate::ui::{self, UiContext};
use crate::version::{validate_alias, LibVersion};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> ShmgrResult<()> {
    if let Some(alias) = args.alias.as_deref() {
        validate_alias(alias).map_err(ShmgrError::User)?;
    }

    let resolver = build_resolver(config, args.cache_dir.as_deref()).await;
    let inventory = resolver.inventory(args.alias.as_deref()).await?;

    let ctx = UiContext::detect();
    for warning in &inventory.warnings {
        ui::step_warn_hint(
            &ctx,
            &format!("Provider {} skipped: {}", warning.provider, warning.reason),
            "Check its provider.toml",
        );
    }

    if inventory.libraries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::remark(&ctx, "No shell libraries installed or cached"),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&inventory.libraries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inventory.libraries)?),
        OutputFormat::Plain => print_plain(&inventory.libraries),
    }

    Ok(())
}

fn print_table(libraries: &[LibraryListing]) {
    println!(
        "{:<24} {:<12} {:<12} {:<20}",
        style("LIBRARY").bold(),
        style("INSTALLED").bold(),
        style("CACHED").bold(),
        style("PROVIDER").bold()
    );
    println!("{}", "-".repeat(68));

    for lib in libraries {
        let name = format!("{}:{}", lib.alias, lib.major);
        let cached = match (lib.cached, lib.installed) {
            (Some(c), Some(i)) if c < i => style(c.to_string()).yellow(),
            (Some(c), _) => style(c.to_string()).green(),
            (None, _) => style("-".to_string()).dim(),
        };

        println!(
            "{:<24} {:<12} {:<12} {:<20}",
            name,
            version_or_dash(lib.installed),
            cached,
            lib.provider.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("{} library(s)", libraries.len());
}

fn print_plain(libraries: &[LibraryListing]) {
    for lib in libraries {
        // Best version known locally, cached or installed
        if let Some(version) = lib.installed.max(lib.cached) {
            println!("{}:{}", lib.alias, version);
        }
    }
}

fn version_or_dash(version: Option<LibVersion>) -> String {
    version.map_or_else(|| "-".to_string(), |v| v.to_string())
}
