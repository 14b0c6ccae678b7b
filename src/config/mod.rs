//! Configuration management for ComfyPod

pub mod schema;

pub use schema::Config;

use crate::error::{ComfyPodError, ComfyPodResult};
use crate::workload::Workload;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("comfypod")
            .join("config.toml")
    }

    /// Get the default tokens file path under the config directory
    pub fn default_tokens_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("comfypod")
            .join("tokens.json")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("comfypod")
    }

    /// Shared HuggingFace download cache, reused across all workloads
    pub fn cache_dir() -> PathBuf {
        Self::state_dir().join("hf-cache")
    }

    /// Per-workload model tree, populated with symlinks into the cache
    pub fn models_dir(workload: Workload) -> PathBuf {
        Self::state_dir().join("models").join(workload.to_string())
    }

    /// Scratch directory for image build contexts
    pub fn builds_dir() -> PathBuf {
        Self::state_dir().join("builds")
    }

    /// Load configuration, using defaults if the file doesn't exist
    pub async fn load(&self) -> ComfyPodResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ComfyPodResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ComfyPodError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ComfyPodError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> ComfyPodResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ComfyPodError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> ComfyPodResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ComfyPodError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure all state directories exist
    pub async fn ensure_state_dirs() -> ComfyPodResult<()> {
        let dirs = [
            Self::state_dir(),
            Self::cache_dir(),
            Self::state_dir().join("models"),
            Self::builds_dir(),
        ];

        for dir in &dirs {
            fs::create_dir_all(dir).await.map_err(|e| {
                ComfyPodError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }

        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.serve.port, 8000);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.serve.port = 8188;

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.serve.port, 8188);
    }

    #[tokio::test]
    async fn invalid_toml_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "serve = not-a-table").await.unwrap();

        let manager = ConfigManager::with_path(path);
        assert!(manager.load().await.is_err());
    }

    #[test]
    fn models_dir_is_per_workload() {
        let ace = ConfigManager::models_dir(Workload::AceStep);
        let wan = ConfigManager::models_dir(Workload::Wan);
        assert_ne!(ace, wan);
        assert!(ace.ends_with("models/ace-step"));
    }
}
