use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REFRESH_RETENTION_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Executable used for all repository operations
    #[serde(default)]
    pub git_binary: Option<String>,

    /// How long a finished refresh keeps absorbing duplicate refresh requests
    #[serde(default)]
    pub refresh_retention_ms: Option<u64>,

    /// Base revision for new branches when none is given
    #[serde(default)]
    pub default_base: Option<String>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/branchy/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("branchy/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("branchy\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    if let Ok(config) = Self::from_toml(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn from_toml(content: &str) -> crate::BranchyResult<Self> {
        toml::from_str(content).map_err(|e| crate::BranchyError::Config(e.to_string()))
    }

    pub fn effective_git_binary(&self) -> &str {
        self.git_binary.as_deref().unwrap_or("git")
    }

    pub fn effective_refresh_retention(&self) -> Duration {
        Duration::from_millis(
            self.refresh_retention_ms
                .unwrap_or(DEFAULT_REFRESH_RETENTION_MS),
        )
    }
}
