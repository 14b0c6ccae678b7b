//! Workloads command - list the supported workloads

use crate::cli::args::{OutputFormat, WorkloadsArgs};
use crate::error::ComfyPodResult;
use crate::workload::{catalog, Workload};

/// Execute the workloads command
pub fn execute(args: WorkloadsArgs) -> ComfyPodResult<()> {
    match args.format {
        OutputFormat::Table => print_table(),
        OutputFormat::Json => print_json()?,
        OutputFormat::Plain => print_plain(),
    }
    Ok(())
}

fn print_table() {
    println!(
        "{:<10} {:<10} {:<18} {:<8} {}",
        "WORKLOAD", "GPU", "APP", "MODELS", "DESCRIPTION"
    );
    println!("{}", "-".repeat(96));

    for w in Workload::all() {
        let p = catalog::profile(*w);
        println!(
            "{:<10} {:<10} {:<18} {:<8} {}",
            w.to_string(),
            p.gpu.to_string(),
            p.app_name,
            p.models.len(),
            w.description()
        );
    }
}

fn print_json() -> ComfyPodResult<()> {
    let rows: Vec<serde_json::Value> = Workload::all()
        .iter()
        .map(|w| {
            let p = catalog::profile(*w);
            serde_json::json!({
                "workload": w.to_string(),
                "gpu": p.gpu.to_string(),
                "app": p.app_name,
                "output_volume": p.output_volume,
                "nodes": p.nodes,
                "models": p.models.len(),
                "description": w.description(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_plain() {
    for w in Workload::all() {
        println!("{}", w);
    }
}
