//! Cache command - manage the shared model cache

use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ComfyPodError, ComfyPodResult};
use crate::fetch::find_broken_links;
use crate::ui::{self, UiContext};
use crate::workload::Workload;
use console::style;
use std::fs;
use std::path::Path;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ComfyPodResult<()> {
    match args.action {
        CacheAction::Info => info(config),
        CacheAction::Verify { workload } => verify(workload),
        CacheAction::Clear { yes } => clear(yes).await,
    }
}

/// Show cache location, size, and entry count
fn info(_config: &Config) -> ComfyPodResult<()> {
    let cache_dir = ConfigManager::cache_dir();

    println!("Cache: {}", cache_dir.display());

    if !cache_dir.exists() {
        println!("  (empty - created on first build)");
        return Ok(());
    }

    let entries = fs::read_dir(&cache_dir)
        .map_err(|e| ComfyPodError::io("reading cache directory", e))?
        .count();
    println!("  Size:    {}", format_bytes(dir_size(&cache_dir)));
    println!("  Entries: {}", entries);

    Ok(())
}

/// Report broken model links (e.g. after an external cache wipe)
fn verify(workload: Option<Workload>) -> ComfyPodResult<()> {
    let targets: Vec<Workload> = match workload {
        Some(w) => vec![w],
        None => Workload::all().to_vec(),
    };

    let mut total_broken = 0;
    for w in targets {
        let models_root = ConfigManager::models_dir(w);
        let broken = find_broken_links(&models_root)?;

        if broken.is_empty() {
            println!("{} {}: all links valid", style("✓").green(), w);
        } else {
            println!(
                "{} {}: {} broken link(s)",
                style("✗").red(),
                w,
                broken.len()
            );
            for link in &broken {
                println!("    {}", link.display());
            }
            total_broken += broken.len();
        }
    }

    if total_broken > 0 {
        println!();
        println!(
            "Repair with: comfypod build <workload> (re-downloads into the cache and relinks)"
        );
    }

    Ok(())
}

/// Delete every cached download
async fn clear(skip_confirm: bool) -> ComfyPodResult<()> {
    let ctx = UiContext::detect().with_auto_yes(skip_confirm);
    let cache_dir = ConfigManager::cache_dir();

    if !cache_dir.exists() {
        println!("No cache to clear.");
        return Ok(());
    }

    let size = dir_size(&cache_dir);
    let confirmed = ui::confirm(
        &ctx,
        &format!(
            "Delete {} of cached downloads? Model links break until the next build.",
            format_bytes(size)
        ),
        false,
    )
    .await?;

    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    tokio::fs::remove_dir_all(&cache_dir)
        .await
        .map_err(|e| ComfyPodError::io("clearing cache directory", e))?;
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| ComfyPodError::io("recreating cache directory", e))?;

    println!("{} cache cleared ({} freed)", style("✓").green(), format_bytes(size));
    println!("Run `comfypod cache verify` to see which links need a rebuild.");

    Ok(())
}

/// Format bytes as human-readable size (e.g. "1.5 GB")
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Total size of all regular files under a directory
pub(crate) fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            match entry.metadata() {
                Ok(meta) if meta.is_dir() => dir_size(&path),
                Ok(meta) if meta.is_file() => meta.len(),
                _ => 0,
            }
        })
        .sum()
}
