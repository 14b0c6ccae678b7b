//! CLI argument definitions using clap derive

use crate::workload::Workload;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// ComfyPod - ComfyUI workload deployment
///
/// Builds container images, provisions model and output storage, and
/// serves ComfyUI creative-AI workloads in rootless containers.
#[derive(Parser, Debug)]
#[command(name = "comfypod")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMFYPOD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a workload and serve its ComfyUI web UI
    Serve(ServeArgs),

    /// Build a workload's image, models, and volumes without serving
    Build(BuildArgs),

    /// List the supported workloads
    Workloads(WorkloadsArgs),

    /// Check system health and dependencies
    Status,

    /// Manage the shared model cache
    Cache(CacheArgs),

    /// Manage output volumes
    Volume(VolumeArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Workload to serve (reads the APP environment variable when omitted)
    #[arg(value_enum, ignore_case = true, env = "APP")]
    pub workload: Workload,

    /// Force all models to be re-downloaded, ignoring the cache
    #[arg(long)]
    pub redownload_models: bool,

    /// Leave the container running instead of following its logs
    #[arg(short, long)]
    pub detach: bool,

    /// Host port for the web UI (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Tokens file for authenticated downloads
    #[arg(long)]
    pub tokens: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Workload to build (reads the APP environment variable when omitted)
    #[arg(value_enum, ignore_case = true, env = "APP")]
    pub workload: Workload,

    /// Force all models to be re-downloaded, ignoring the cache
    #[arg(long)]
    pub redownload_models: bool,

    /// Tokens file for authenticated downloads
    #[arg(long)]
    pub tokens: Option<PathBuf>,
}

/// Arguments for the workloads command
#[derive(Parser, Debug)]
pub struct WorkloadsArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location and size
    Info,

    /// Report broken model links left behind by an external cache wipe
    Verify {
        /// Only check this workload's model tree
        #[arg(value_enum, ignore_case = true)]
        workload: Option<Workload>,
    },

    /// Delete every cached download
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the volume command
#[derive(Parser, Debug)]
pub struct VolumeArgs {
    /// Subcommand for volume
    #[command(subcommand)]
    pub action: VolumeAction,
}

/// Volume subcommands
#[derive(Subcommand, Debug)]
pub enum VolumeAction {
    /// List comfypod-managed volumes
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. serve.port)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
