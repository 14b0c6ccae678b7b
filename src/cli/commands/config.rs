//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ComfyPodError, ComfyPodResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config) -> ComfyPodResult<()> {
    let manager = ConfigManager::new();

    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(&manager),
        Some(ConfigAction::Init { force }) => init_config(&manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(&manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> ComfyPodResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    let config = Config::default();
    manager.save(&config).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> ComfyPodResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    // Parse dot-separated key path
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = value.to_string(),

        ["container", "base_image"] => config.container.base_image = value.to_string(),
        ["container", "comfy_dir"] => config.container.comfy_dir = value.to_string(),

        ["serve", "port"] => config.serve.port = parse_num(value)?,
        ["serve", "concurrent_inputs"] => config.serve.concurrent_inputs = parse_num(value)?,
        ["serve", "startup_timeout_secs"] => {
            config.serve.startup_timeout_secs = parse_num(value)?
        }

        ["download", "hf_transfer"] => config.download.hf_transfer = parse_bool(value)?,
        ["download", "tokens_file"] => {
            config.download.tokens_file = Some(PathBuf::from(value))
        }

        _ => {
            return Err(ComfyPodError::User(format!(
                "Unknown configuration key: {}",
                key
            )))
        }
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("{} = {}", key, value));

    Ok(())
}

fn parse_bool(value: &str) -> ComfyPodResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ComfyPodError::User(format!(
            "Expected a boolean, got '{}'",
            value
        ))),
    }
}

fn parse_num<T: std::str::FromStr>(value: &str) -> ComfyPodResult<T> {
    value
        .parse()
        .map_err(|_| ComfyPodError::User(format!("Expected a number, got '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_variants() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("YES").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn parse_num_valid() {
        let port: u16 = parse_num("8188").unwrap();
        assert_eq!(port, 8188);
    }

    #[test]
    fn parse_num_invalid() {
        let result: ComfyPodResult<u16> = parse_num("eight");
        assert!(result.is_err());
    }
}
