//! Volume command - manage output volumes

use crate::build::labels;
use crate::cli::args::{OutputFormat, VolumeAction, VolumeArgs};
use crate::config::Config;
use crate::error::ComfyPodResult;
use crate::orchestration::{create_runtime, VolumeInfo};

/// Execute the volume command
pub async fn execute(args: VolumeArgs, _config: &Config) -> ComfyPodResult<()> {
    let runtime = create_runtime()?;

    match args.action {
        VolumeAction::List { format } => {
            let filter = format!("{}=true", labels::MANAGED);
            let volumes = runtime.volume_list(&filter).await?;

            if volumes.is_empty() {
                println!("No comfypod volumes found.");
                return Ok(());
            }

            match format {
                OutputFormat::Table => print_table(&volumes),
                OutputFormat::Json => print_json(&volumes)?,
                OutputFormat::Plain => print_plain(&volumes),
            }

            Ok(())
        }
    }
}

fn print_table(volumes: &[VolumeInfo]) {
    println!("{:<28} {:<18} {:<10}", "VOLUME", "APP", "GPU");
    println!("{}", "-".repeat(58));

    for volume in volumes {
        let app = volume
            .labels
            .get(labels::APP)
            .map(String::as_str)
            .unwrap_or("-");
        let gpu = volume
            .labels
            .get(labels::GPU)
            .map(String::as_str)
            .unwrap_or("-");
        println!("{:<28} {:<18} {:<10}", volume.name, app, gpu);
    }

    println!();
    println!("Total: {} volume(s)", volumes.len());
}

fn print_json(volumes: &[VolumeInfo]) -> ComfyPodResult<()> {
    #[derive(serde::Serialize)]
    struct VolumeJson<'a> {
        name: &'a str,
        app: Option<&'a String>,
        workload: Option<&'a String>,
        created_at: Option<&'a String>,
    }

    let rows: Vec<VolumeJson> = volumes
        .iter()
        .map(|v| VolumeJson {
            name: &v.name,
            app: v.labels.get(labels::APP),
            workload: v.labels.get(labels::WORKLOAD),
            created_at: v.labels.get(labels::CREATED_AT),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_plain(volumes: &[VolumeInfo]) {
    for volume in volumes {
        println!("{}", volume.name);
    }
}
