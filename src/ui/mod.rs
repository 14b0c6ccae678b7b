//! UI module for consistent CLI output
//!
//! Uses `cliclack` for styled output with automatic fallback to plain
//! text in CI/non-interactive environments.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, note, outro_success, outro_warn, remark, section, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{BuildProgress, TaskSpinner};
pub use prompts::confirm;
