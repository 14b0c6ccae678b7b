//! Build command - build a workload's image, models, and volumes

use crate::cli::args::{BuildArgs, ServeArgs};
use crate::cli::commands::serve::{build_with_progress, print_output_volume_usage};
use crate::config::Config;
use crate::error::ComfyPodResult;
use crate::orchestration::create_runtime;
use crate::tokens::TokenStore;
use crate::ui::{self, UiContext};
use crate::workload::catalog;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> ComfyPodResult<()> {
    let ctx = UiContext::detect();
    let profile = catalog::profile(args.workload);

    ui::intro(&ctx, &format!("ComfyPod · build {}", profile.app_name));

    let runtime = create_runtime()?;
    debug!("Using runtime: {}", runtime.runtime_name());
    runtime.ensure_ready().await?;

    let tokens = TokenStore::discover(
        args.tokens
            .as_deref()
            .or(config.download.tokens_file.as_deref()),
    )
    .await?;

    let serve_args = ServeArgs {
        workload: args.workload,
        redownload_models: args.redownload_models,
        detach: false,
        port: None,
        tokens: args.tokens.clone(),
    };
    let app = build_with_progress(&ctx, runtime.as_ref(), config, &serve_args, &tokens).await?;

    ui::step_ok_detail(&ctx, "Image ready", &app.image_tag);
    ui::step_ok_detail(
        &ctx,
        "Models linked",
        &format!("{} artifact(s)", profile.models.len()),
    );
    print_output_volume_usage(&ctx, &app);

    ui::remark(
        &ctx,
        &format!("Serve it with: comfypod serve {}", args.workload),
    );
    ui::outro_success(&ctx, "Build complete");
    Ok(())
}
