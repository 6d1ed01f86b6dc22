//! Client configuration.
//!
//! Defaults, optionally overlaid by a JSON file, then by `MEMEFORGE_*`
//! environment variables.

use crate::api::ApiClient;
use crate::auth::FileSessionStore;
use crate::error::{ApiError, ConfigError};
use crate::fetch::HttpImageFetcher;
use crate::transport::HttpTransport;
use mf_render::{Compositor, CompositorConfig, RenderError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "MEMEFORGE_API_URL";
pub const ENV_ASSET_BASE: &str = "MEMEFORGE_ASSET_BASE";
pub const ENV_SESSION_PATH: &str = "MEMEFORGE_SESSION_PATH";
pub const ENV_TIMEOUT_SECS: &str = "MEMEFORGE_TIMEOUT_SECS";

fn default_api_base_url() -> String {
    "http://localhost:5000/api".into()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Where relative image paths resolve; defaults to the API's host.
    #[serde(default)]
    pub asset_base: Option<String>,
    #[serde(default)]
    pub session_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub compositor: CompositorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            asset_base: None,
            session_path: None,
            timeout_secs: default_timeout_secs(),
            compositor: CompositorConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `MEMEFORGE_*` variables from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(base) = lookup(ENV_ASSET_BASE) {
            self.asset_base = Some(base);
        }
        if let Some(path) = lookup(ENV_SESSION_PATH) {
            self.session_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::Env {
                key: ENV_TIMEOUT_SECS,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Asset base for relative image paths: the configured one, or the API
    /// URL with its `/api` suffix removed.
    pub fn resolved_asset_base(&self) -> String {
        self.asset_base.clone().unwrap_or_else(|| {
            let base = self.api_base_url.trim_end_matches('/');
            base.strip_suffix("/api").unwrap_or(base).to_string()
        })
    }

    pub fn session_store(&self) -> FileSessionStore {
        match &self.session_path {
            Some(path) => FileSessionStore::new(path),
            None => FileSessionStore::default(),
        }
    }

    pub fn api_client(&self) -> Result<ApiClient, ApiError> {
        let transport = HttpTransport::new(&self.api_base_url, self.timeout())?;
        Ok(ApiClient::new(Box::new(transport), Box::new(self.session_store())))
    }

    pub fn compositor(&self) -> Result<Compositor, RenderError> {
        let config = CompositorConfig {
            asset_base: Some(self.resolved_asset_base()),
            ..self.compositor.clone()
        };
        let fetcher = HttpImageFetcher::new(self.timeout())?;
        Ok(Compositor::new(&config).with_fetcher(Box::new(fetcher)))
    }
}
