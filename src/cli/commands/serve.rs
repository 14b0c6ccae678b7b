//! Serve command - build a workload and expose its ComfyUI web UI

use crate::build::{self, BuiltApp};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::{ComfyPodError, ComfyPodResult};
use crate::orchestration::{create_runtime, ContainerRuntime, RunSpec};
use crate::tokens::TokenStore;
use crate::ui::{self, BuildProgress, UiContext};
use crate::workload::catalog;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Port ComfyUI listens on inside the container
const CONTAINER_PORT: u16 = 8000;

/// How often to probe the UI port while waiting for startup
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> ComfyPodResult<()> {
    let ctx = UiContext::detect();
    let profile = catalog::profile(args.workload);

    ui::intro(&ctx, &format!("ComfyPod · {}", profile.app_name));

    let runtime = create_runtime()?;
    debug!("Using runtime: {}", runtime.runtime_name());
    runtime.ensure_ready().await?;

    // One interactive session per app
    if let Some(id) = runtime.container_running(profile.app_name).await? {
        return Err(ComfyPodError::AlreadyServing {
            name: profile.app_name.to_string(),
            container: id[..12.min(id.len())].to_string(),
        });
    }

    let tokens = TokenStore::discover(
        args.tokens
            .as_deref()
            .or(config.download.tokens_file.as_deref()),
    )
    .await?;

    let app = build_with_progress(
        &ctx,
        runtime.as_ref(),
        config,
        &args,
        &tokens,
    )
    .await?;

    print_output_volume_usage(&ctx, &app);

    let port = args.port.unwrap_or(config.serve.port);
    let spec = run_spec(&app, config, port);

    let mut spinner = ui::TaskSpinner::new(&ctx);
    spinner.start(&format!("Starting {}...", app.app_name));

    let container_id = runtime.run(&spec).await?;
    debug!("Container: {}", container_id);

    spinner.message(&format!(
        "Waiting for ComfyUI on port {} (up to {}s)...",
        port, config.serve.startup_timeout_secs
    ));

    if let Err(e) = wait_for_ready(port, config.serve.startup_timeout_secs).await {
        spinner.stop_error("ComfyUI failed to start");
        // leave nothing half-running behind the failed deadline
        let _ = runtime.stop(&app.app_name).await;
        let _ = runtime.remove(&app.app_name).await;
        return Err(e);
    }

    spinner.stop(&format!("{} is up", app.app_name));
    ui::step_info(&ctx, &format!("Open http://localhost:{} in the browser", port));
    info!("Serving {} on port {}", app.app_name, port);

    if args.detach {
        ui::remark(&ctx, &format!("Stop with: podman stop {}", app.app_name));
        ui::outro_success(&ctx, "Serving in the background");
        return Ok(());
    }

    // Follow the UI logs until the user interrupts
    runtime.logs_follow(&app.app_name).await?;
    Ok(())
}

/// Build the app, streaming image build output into a progress bar
pub(crate) async fn build_with_progress(
    ctx: &UiContext,
    runtime: &dyn ContainerRuntime,
    config: &Config,
    args: &ServeArgs,
    tokens: &TokenStore,
) -> ComfyPodResult<BuiltApp> {
    let profile = catalog::profile(args.workload);
    let progress = BuildProgress::new(ctx, profile.app_name);

    let result = build::build_app(
        runtime,
        config,
        args.workload,
        tokens,
        args.redownload_models,
        &|line| progress.on_line(line),
    )
    .await;

    progress.finish();
    result
}

/// Print the two operator hints for the output volume
pub(crate) fn print_output_volume_usage(ctx: &UiContext, app: &BuiltApp) {
    let [get_hint, rm_hint] = app.output_volume_hints();
    ui::note(ctx, "Output volume", &format!("{}\n{}", get_hint, rm_hint));
}

fn run_spec(app: &BuiltApp, config: &Config, port: u16) -> RunSpec {
    let mut env = HashMap::new();
    // the UI startup sequence fires several API calls concurrently; a
    // fronting proxy can read the ceiling from the environment
    env.insert(
        "COMFYPOD_CONCURRENT_INPUTS".to_string(),
        config.serve.concurrent_inputs.to_string(),
    );

    RunSpec {
        name: app.app_name.clone(),
        image: app.image_tag.clone(),
        volumes: app.volumes.iter().map(|v| v.volume_arg()).collect(),
        env,
        ports: vec![(port, CONTAINER_PORT)],
        gpu_device: Some(app.gpu.device_request().to_string()),
        command: launch_command(),
    }
}

/// The ComfyUI launch command run inside the container
fn launch_command() -> Vec<String> {
    [
        "comfy",
        "launch",
        "--",
        "--listen",
        "0.0.0.0",
        "--port",
        "8000",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Poll the published port until it accepts connections or the startup
/// deadline passes.
async fn wait_for_ready(port: u16, timeout_secs: u64) -> ComfyPodResult<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);

    loop {
        match tokio::net::TcpStream::connect(("127.0.0.1", port)).await {
            Ok(_) => return Ok(()),
            Err(_) if tokio::time::Instant::now() < deadline => {
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
            Err(_) => {
                return Err(ComfyPodError::StartupTimeout { secs: timeout_secs });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuiltApp, VolumeMount, VolumeSource};
    use crate::workload::{GpuTier, Workload};

    fn sample_app() -> BuiltApp {
        BuiltApp {
            workload: Workload::Wan,
            app_name: "wan-comfyui".to_string(),
            image_tag: "wan-comfyui-abc123def456".to_string(),
            gpu: GpuTier::L40S,
            output_volume: "wan-comfyui-output".to_string(),
            volumes: vec![VolumeMount {
                source: VolumeSource::Named("wan-comfyui-output".to_string()),
                container_path: "/root/comfy/ComfyUI/output".to_string(),
                readonly: false,
            }],
        }
    }

    #[test]
    fn run_spec_publishes_the_ui_port() {
        let config = Config::default();
        let spec = run_spec(&sample_app(), &config, 8000);

        assert_eq!(spec.name, "wan-comfyui");
        assert_eq!(spec.ports, vec![(8000, CONTAINER_PORT)]);
        assert_eq!(spec.gpu_device.as_deref(), Some("nvidia.com/gpu=all"));
        assert_eq!(
            spec.env.get("COMFYPOD_CONCURRENT_INPUTS"),
            Some(&"10".to_string())
        );
        assert_eq!(
            spec.volumes,
            vec!["wan-comfyui-output:/root/comfy/ComfyUI/output"]
        );
    }

    #[test]
    fn launch_command_listens_on_all_interfaces() {
        let cmd = launch_command().join(" ");
        assert_eq!(cmd, "comfy launch -- --listen 0.0.0.0 --port 8000");
    }

    #[tokio::test]
    async fn wait_for_ready_times_out_on_closed_port() {
        // nothing listens on this port; zero-second deadline fails fast
        let result = wait_for_ready(1, 0).await;
        assert!(matches!(
            result,
            Err(ComfyPodError::StartupTimeout { secs: 0 })
        ));
    }

    #[tokio::test]
    async fn wait_for_ready_connects_to_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        wait_for_ready(port, 5).await.unwrap();
    }
}
