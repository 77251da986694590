/// Service configuration
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "TEXTPLAYLIST";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub playlist: PlaylistSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Front-end build served at `/` when present
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Catalog credentials and transport settings.
///
/// The public search endpoint is unauthenticated; `app_id` is only carried
/// for front ends that load the catalog's browser SDK.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub app_id: Option<String>,

    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistSettings {
    #[serde(default = "default_count")]
    pub default_count: usize,

    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

impl CatalogSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key, ignoring blank values coming from empty env vars
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl PlaylistSettings {
    /// Resolve a requested count: missing → default, negative → 0, capped at `max_count`.
    pub fn resolve_count(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_count.min(self.max_count),
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX).min(self.max_count),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used when it exists. Environment variables look like
    /// `TEXTPLAYLIST_LLM__API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {:?}",
                        path
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.catalog.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::Config("Catalog base URL cannot be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(
                "Catalog base URL must start with http:// or https://".to_string(),
            ));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(AppError::Config(
                "Catalog timeout must be at least one second".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(AppError::Config(
                "LLM timeout must be at least one second".to_string(),
            ));
        }
        if self.playlist.default_count > self.playlist.max_count {
            return Err(AppError::Config(format!(
                "playlist.default_count ({}) exceeds playlist.max_count ({})",
                self.playlist.default_count, self.playlist.max_count
            )));
        }
        Ok(())
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_base_url() -> String {
    "https://api.deezer.com".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_llm_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_llm_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_llm_max_tokens() -> u32 {
    1024
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_count() -> usize {
    10
}

fn default_max_count() -> usize {
    50
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            app_id: None,
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            max_count: default_max_count(),
        }
    }
}
