//! Settings resolution for tbx-export
//!
//! Turns the layered [`TomlConfig`] into validated runtime settings.
//! Credentials come from the environment first, then the TOML file.

use std::time::Duration;
use tbx_common::config::{
    SpotifyConfig, TomlConfig, SPOTIFY_CLIENT_ID_ENV, SPOTIFY_CLIENT_SECRET_ENV,
    SPOTIFY_REFRESH_TOKEN_ENV,
};
use tbx_common::time::secs_to_duration;
use tbx_common::{Error, Result};

use crate::services::{OAuthCredentials, ResolverSettings};

/// Validated runtime settings
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub bind: String,
    pub resolver: ResolverSettings,
    pub request_timeout: Duration,
    pub catalog_base_url: String,
    pub spotify_api_base: String,
    pub spotify_accounts_base: String,
    pub credentials: OAuthCredentials,
    pub allowed_origins: Vec<String>,
}

impl ExportSettings {
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let resolver = ResolverSettings::from_config(&config.resolver)
            .map_err(|e| Error::Config(e.to_string()))?;

        if config.resolver.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be greater than zero".to_string()));
        }

        Ok(Self {
            bind: config.server.bind.clone(),
            resolver,
            request_timeout: secs_to_duration(config.resolver.request_timeout_secs),
            catalog_base_url: config.catalog.base_url.clone(),
            spotify_api_base: config.spotify.api_base.clone(),
            spotify_accounts_base: config.spotify.accounts_base.clone(),
            credentials: resolve_credentials(&config.spotify)?,
            allowed_origins: config.cors.allowed_origins.clone(),
        })
    }
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Collect the OAuth credentials, naming every missing value in the error
pub fn resolve_credentials(config: &SpotifyConfig) -> Result<OAuthCredentials> {
    let pick = |value: &Option<String>| value.as_deref().filter(|v| is_valid_key(v)).map(str::to_string);

    let client_id = pick(&config.client_id);
    let client_secret = pick(&config.client_secret);
    let refresh_token = pick(&config.refresh_token);

    match (client_id, client_secret, refresh_token) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(OAuthCredentials {
            client_id,
            client_secret,
            refresh_token,
        }),
        (client_id, client_secret, refresh_token) => {
            let missing: Vec<&str> = [
                (client_id.is_none(), SPOTIFY_CLIENT_ID_ENV),
                (client_secret.is_none(), SPOTIFY_CLIENT_SECRET_ENV),
                (refresh_token.is_none(), SPOTIFY_REFRESH_TOKEN_ENV),
            ]
            .into_iter()
            .filter_map(|(absent, name)| absent.then_some(name))
            .collect();

            Err(Error::Config(format!(
                "Playlist API credentials not configured (missing: {}). Set the environment \
                 variables or the [spotify] section of the TOML config.",
                missing.join(", ")
            )))
        }
    }
}
