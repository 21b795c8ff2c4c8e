/// CLI configuration
use crate::error::{CliError, Result};
use encore_api_client::{ApiConfig, DEFAULT_TIMEOUT_SECS};
use encore_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "encore.toml";

/// Environment prefix; nested keys use a double underscore
/// (`ENCORE_API__ACCESS_TOKEN`, `ENCORE_PLAYER__VOLUME`)
pub const ENV_PREFIX: &str = "ENCORE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub player: PlaybackConfig,

    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Streaming API; without it stream URLs come from the playlist file
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_liked_path")]
    pub liked_path: PathBuf,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `encore.toml` is used when
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        Self::load_with(path, env)
    }

    fn load_with(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables
        settings = settings.add_source(env);

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(CliError::Config(format!(
                "player.volume must be within 0.0-1.0 (got {})",
                self.player.volume
            )));
        }

        if self.player.tick_interval_ms == 0 {
            return Err(CliError::Config(
                "player.tick_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(CliError::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.api.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "api.base_url must start with http:// or https:// (got {url})"
                )));
            }
        }

        Ok(())
    }

    /// API client configuration, if a streaming API is configured
    pub fn api_config(&self) -> Option<ApiConfig> {
        let base_url = self.api.base_url.as_ref()?;
        let config = match &self.api.access_token {
            Some(token) => ApiConfig::with_token(base_url, token),
            None => ApiConfig::new(base_url),
        };
        Some(config.timeout_secs(self.api.timeout_secs))
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        base_url: None,
        access_token: None,
        timeout_secs: default_timeout_secs(),
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        liked_path: default_liked_path(),
    }
}

fn default_liked_path() -> PathBuf {
    PathBuf::from("./data/liked.json")
}

impl Default for ApiSettings {
    fn default() -> Self {
        default_api()
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        default_storage()
    }
}
