//! Interactive prompts with CI fallback

use super::context::UiContext;
use crate::error::{ComfyPodError, ComfyPodResult};

/// Ask for confirmation.
///
/// Auto-approves with --yes, falls back to the default answer in
/// non-interactive environments.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ComfyPodResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    cliclack::confirm(message)
        .initial_value(default)
        .interact()
        .map_err(|e| ComfyPodError::io("reading confirmation", e))
}
