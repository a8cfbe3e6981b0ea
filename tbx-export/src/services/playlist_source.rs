//! Playlist metadata provider

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::credential_provider::{CredentialError, CredentialProvider};
use crate::models::RawPlaylist;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Playlist not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Fetches a playlist's raw metadata and track listing
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<RawPlaylist, PlaylistError>;
}

/// Spotify Web API `GET /v1/playlists/{id}`
pub struct SpotifyPlaylistSource {
    http_client: reqwest::Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
    request_timeout: Duration,
}

impl SpotifyPlaylistSource {
    pub fn new(
        http_client: reqwest::Client,
        api_base: &str,
        credentials: Arc<dyn CredentialProvider>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            request_timeout,
        }
    }
}

#[async_trait]
impl PlaylistSource for SpotifyPlaylistSource {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<RawPlaylist, PlaylistError> {
        let token = self.credentials.access_token().await?;

        let mut url = reqwest::Url::parse(&format!("{}/v1/playlists", self.api_base))
            .map_err(|e| PlaylistError::NetworkError(format!("Invalid playlist API URL: {}", e)))?;
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(playlist_id);
        }

        tracing::debug!(playlist_id = %playlist_id, url = %url, "Fetching playlist");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| PlaylistError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlaylistError::NotFound(playlist_id.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlaylistError::ApiError(status.as_u16(), error_text));
        }

        let playlist: RawPlaylist = response
            .json()
            .await
            .map_err(|e| PlaylistError::ParseError(e.to_string()))?;

        tracing::info!(
            playlist_id = %playlist_id,
            name = %playlist.name.as_deref().unwrap_or("Unknown"),
            items = playlist.track_items().len(),
            "Retrieved playlist"
        );

        Ok(playlist)
    }
}
