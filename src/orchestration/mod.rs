//! Orchestration module for container runtimes
//!
//! Wraps the rootless Podman CLI behind a trait so the build and serve
//! flows stay testable and runtime-agnostic.

mod container;
mod factory;
mod podman;
mod runtime;

pub use container::{RunSpec, VolumeInfo};
pub use factory::{create_runtime, Platform};
pub use podman::PodmanRuntime;
pub use runtime::ContainerRuntime;

use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(lines: &[String]) -> String {
    let total = lines.len();
    let tail = if total > BUILD_ERROR_TAIL_LINES {
        &lines[total - BUILD_ERROR_TAIL_LINES..]
    } else {
        lines
    };
    tail.join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns all collected output lines for error reporting. This is a standalone
/// async function (not behind `async_trait`) to avoid lifetime issues with the
/// `dyn Fn` callback.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(String) + Send + Sync),
) -> Vec<String> {
    let stderr = child.stderr.take().expect("stderr piped");
    let stdout = child.stdout.take().expect("stdout piped");

    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_reader = BufReader::new(stdout).lines();

    let mut all_output = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    _ => stderr_done = true,
                }
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    _ => stdout_done = true,
                }
            }
        }
    }

    all_output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_tail_keeps_short_output() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(build_error_output(&lines), "a\nb");
    }

    #[test]
    fn error_tail_truncates_long_output() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {}", i)).collect();
        let tail = build_error_output(&lines);
        assert!(!tail.contains("line 49"));
        assert!(tail.starts_with("line 50"));
        assert!(tail.ends_with("line 99"));
    }
}
