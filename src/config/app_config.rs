use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{LoaderDefaults, DEFAULT_REGION, DEFAULT_UNSTRUCTURED_API_URL};
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::s3::S3FetcherConfig;
use crate::infrastructure::staging::ScratchArea;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub loader: LoaderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Deployment-wide loader settings; requests may override most of them
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Parent of per-invocation staging directories (OS temp dir when unset)
    pub scratch_root: Option<PathBuf>,
    pub unstructured_api_url: String,
    pub unstructured_api_key: Option<String>,
    pub region: String,
    pub s3_endpoint_url: Option<String>,
    pub s3_force_path_style: bool,
    /// Deadline for one load invocation; no deadline when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            scratch_root: None,
            unstructured_api_url: DEFAULT_UNSTRUCTURED_API_URL.to_string(),
            unstructured_api_key: None,
            region: DEFAULT_REGION.to_string(),
            s3_endpoint_url: None,
            s3_force_path_style: false,
            request_timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for LoaderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderSettings")
            .field("scratch_root", &self.scratch_root)
            .field("unstructured_api_url", &self.unstructured_api_url)
            .field(
                "unstructured_api_key",
                &self.unstructured_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("region", &self.region)
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .field("s3_force_path_style", &self.s3_force_path_style)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl LoaderSettings {
    pub fn defaults(&self) -> LoaderDefaults {
        LoaderDefaults {
            unstructured_api_url: self.unstructured_api_url.clone(),
            unstructured_api_key: self
                .unstructured_api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            region: self.region.clone(),
        }
    }

    pub fn scratch_area(&self) -> ScratchArea {
        match &self.scratch_root {
            Some(root) => ScratchArea::new(root),
            None => ScratchArea::system(),
        }
    }

    pub fn fetcher_config(&self) -> S3FetcherConfig {
        S3FetcherConfig {
            endpoint_url: self.s3_endpoint_url.clone(),
            force_path_style: self.s3_force_path_style,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Layered load: `config/default`, `config/local`, then `APP__*` env vars
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
