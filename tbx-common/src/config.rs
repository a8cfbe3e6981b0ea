//! Configuration loading and config file resolution
//!
//! Settings are layered, highest priority first:
//! 1. Command-line argument (handled by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing TOML file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Maximum simultaneous catalog lookups when nothing else is configured
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;
/// Timeout applied to every outbound HTTP call
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://jiosaavn-api-dc21.onrender.com";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com";
pub const DEFAULT_SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TBX_CONFIG";
pub const CONCURRENCY_LIMIT_ENV: &str = "TBX_CONCURRENCY_LIMIT";
pub const REQUEST_TIMEOUT_ENV: &str = "TBX_REQUEST_TIMEOUT_SECS";
pub const SPOTIFY_CLIENT_ID_ENV: &str = "SPOTIPY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_ENV: &str = "SPOTIPY_CLIENT_SECRET";
pub const SPOTIFY_REFRESH_TOKEN_ENV: &str = "SPOTIFY_REFRESH_TOKEN";

/// Contents of `<config_dir>/tbx/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub resolver: ResolverConfig,
    pub catalog: CatalogConfig,
    pub spotify: SpotifyConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bounded resolver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum lookups with outstanding network activity (must be > 0)
    pub concurrency_limit: usize,
    /// Per-call timeout for search and detail requests
    pub request_timeout_secs: u64,
    /// Optional overall deadline for one batch; unset means wait for every lookup
    pub batch_deadline_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            batch_deadline_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
        }
    }
}

/// Playlist provider credentials and endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub api_base: String,
    pub accounts_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            api_base: DEFAULT_SPOTIFY_API_BASE.to_string(),
            accounts_base: DEFAULT_SPOTIFY_ACCOUNTS_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "https://musify-harsh.vercel.app".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}

impl TomlConfig {
    /// Apply environment variable overrides on top of file values
    ///
    /// Credentials keep the `SPOTIPY_*` / `SPOTIFY_REFRESH_TOKEN` names.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(limit) = env_value(CONCURRENCY_LIMIT_ENV) {
            self.resolver.concurrency_limit = limit.parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got {:?}", CONCURRENCY_LIMIT_ENV, limit))
            })?;
        }

        if let Some(secs) = env_value(REQUEST_TIMEOUT_ENV) {
            self.resolver.request_timeout_secs = secs.parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds, got {:?}", REQUEST_TIMEOUT_ENV, secs))
            })?;
        }

        if let Some(id) = env_value(SPOTIFY_CLIENT_ID_ENV) {
            self.spotify.client_id = Some(id);
        }
        if let Some(secret) = env_value(SPOTIFY_CLIENT_SECRET_ENV) {
            self.spotify.client_secret = Some(secret);
        }
        if let Some(token) = env_value(SPOTIFY_REFRESH_TOKEN_ENV) {
            self.spotify.refresh_token = Some(token);
        }

        Ok(())
    }
}

/// Non-empty, non-whitespace environment value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Default config file location for a module (`~/.config/tbx/<module>.toml` on Linux)
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tbx").join(format!("{}.toml", module_name)))
}

/// Locates and loads the TOML config for one module
pub struct ConfigFileResolver {
    module_name: String,
}

impl ConfigFileResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Pick the config file path: CLI → `TBX_CONFIG` → platform default
    pub fn locate(&self, cli_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_path {
            return Some(path.to_path_buf());
        }

        if let Some(path) = env_value(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        default_config_path(&self.module_name)
    }

    /// Load the config, falling back to defaults when no file exists
    ///
    /// A file that exists but cannot be parsed is an error.
    pub fn resolve(&self, cli_path: Option<&Path>) -> Result<TomlConfig> {
        let Some(path) = self.locate(cli_path) else {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(TomlConfig::default());
        }

        let config = load_toml_config(&path)?;
        info!(path = %path.display(), module = %self.module_name, "Loaded config file");
        Ok(config)
    }
}
