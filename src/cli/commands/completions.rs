//! Completions command - generate shell completion scripts

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::ComfyPodResult;
use clap::CommandFactory;

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> ComfyPodResult<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "comfypod", &mut std::io::stdout());
    Ok(())
}
