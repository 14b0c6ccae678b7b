//! ComfyPod - ComfyUI workload deployment CLI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use comfypod::cli::{Cli, Commands};
use comfypod::config::ConfigManager;
use comfypod::error::ComfyPodResult;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ComfyPodResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("comfypod=warn"),
        1 => EnvFilter::new("comfypod=info"),
        _ => EnvFilter::new("comfypod=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Completions write to stdout and need no config
    if let Commands::Completions(args) = cli.command {
        return comfypod::cli::commands::completions(args);
    }

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Ensure state directories exist
    ConfigManager::ensure_state_dirs().await?;

    // Dispatch to command
    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Serve(args) => comfypod::cli::commands::serve(args, &config).await,
        Commands::Build(args) => comfypod::cli::commands::build(args, &config).await,
        Commands::Workloads(args) => comfypod::cli::commands::workloads(args),
        Commands::Status => comfypod::cli::commands::status(&config).await,
        Commands::Config(args) => comfypod::cli::commands::config(args, &config).await,
        Commands::Cache(args) => comfypod::cli::commands::cache(args, &config).await,
        Commands::Volume(args) => comfypod::cli::commands::volume(args, &config).await,
    }
}
