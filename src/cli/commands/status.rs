//! Status command - check system health and dependencies

use crate::cli::commands::cache::{dir_size, format_bytes};
use crate::config::{Config, ConfigManager};
use crate::error::ComfyPodResult;
use crate::orchestration::Platform;
use crate::tokens::{TokenStore, CIVITAI_TOKEN, HF_TOKEN};
use console::{style, Emoji};
use std::process::Stdio;
use tokio::process::Command;

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(config: &Config) -> ComfyPodResult<()> {
    println!("{}", style("ComfyPod System Status").bold().cyan());
    println!();

    let mut all_ok = true;
    let platform = Platform::detect();

    println!("{}", style("Platform:").bold());
    println!("  {} Detected: {}", CHECK, platform.name());

    match platform {
        Platform::Linux | Platform::MacOS => {
            all_ok &= check_podman().await;
        }
        Platform::Unsupported => {
            println!();
            println!(
                "  {} {} - ComfyPod supports Linux and macOS only",
                CROSS,
                style("Unsupported platform").red()
            );
            all_ok = false;
        }
    }

    println!();
    println!("{}", style("GPU:").bold());
    check_nvidia().await;

    println!();
    println!("{}", style("Model cache:").bold());
    check_cache();

    println!();
    println!("{}", style("Tokens:").bold());
    check_tokens(config).await;

    println!();
    if all_ok {
        println!("{}", style("All critical checks passed").green().bold());
    } else {
        println!(
            "{}",
            style("Some checks failed - see above for details")
                .yellow()
                .bold()
        );
    }

    Ok(())
}

async fn check_podman() -> bool {
    println!();
    println!("{}", style("Podman:").bold());

    let installed = Command::new("podman")
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    match installed {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("unknown");
            println!("  {} {}", CHECK, style(first_line.trim()).green());
        }
        _ => {
            println!(
                "  {} {} - Install: sudo dnf install podman (or apt-get)",
                CROSS,
                style("Not installed").red()
            );
            return false;
        }
    }

    let rootless = Command::new("podman")
        .args(["info", "--format", "{{.Host.Security.Rootless}}"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    match rootless {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.trim() == "true" {
                println!("  {} {}", CHECK, style("Rootless mode").green());
            } else {
                println!(
                    "  {} {} - Run: podman system migrate",
                    WARN,
                    style("Not in rootless mode").yellow()
                );
                return false;
            }
        }
        _ => {
            println!(
                "  {} {} - Could not check rootless status",
                WARN,
                style("Unknown").yellow()
            );
        }
    }

    true
}

async fn check_nvidia() {
    let result = Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            let names = String::from_utf8_lossy(&output.stdout);
            for name in names.lines().filter(|l| !l.trim().is_empty()) {
                println!("  {} {}", CHECK, style(name.trim()).green());
            }
        }
        _ => {
            println!(
                "  {} {} - GPU workloads will not schedule",
                WARN,
                style("nvidia-smi not found").yellow()
            );
        }
    }
}

fn check_cache() {
    let cache_dir = ConfigManager::cache_dir();
    if cache_dir.exists() {
        let size = dir_size(&cache_dir);
        println!(
            "  {} {} ({})",
            CHECK,
            cache_dir.display(),
            format_bytes(size)
        );
    } else {
        println!(
            "  {} {} - created on first build",
            WARN,
            style("No cache yet").yellow()
        );
    }
}

async fn check_tokens(config: &Config) {
    let store = TokenStore::discover(config.download.tokens_file.as_deref()).await;

    match store {
        Ok(store) if !store.is_empty() => {
            for name in [HF_TOKEN, CIVITAI_TOKEN] {
                if store.get(name).is_some() {
                    println!("  {} {} present", CHECK, name);
                } else {
                    println!(
                        "  {} {} missing - needed for gated downloads",
                        WARN,
                        style(name).yellow()
                    );
                }
            }
        }
        Ok(_) => {
            println!(
                "  {} {} - flux, krita and wan need tokens.json",
                WARN,
                style("No tokens file found").yellow()
            );
        }
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Invalid tokens file").red(), e);
        }
    }
}
