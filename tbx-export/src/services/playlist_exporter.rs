//! Playlist export pipeline
//!
//! Fetch playlist → extract queries → resolve against the catalog → assemble.

use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::bounded_resolver::BoundedResolver;
use super::playlist_source::{PlaylistError, PlaylistSource};
use super::query_extractor::extract_queries;
use super::result_assembler::assemble;
use crate::models::{ExportResponse, PlaylistMeta};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// The playlist has no searchable tracks
    #[error("Playlist not found or empty.")]
    EmptyPlaylist,
}

pub struct PlaylistExporter {
    playlists: Arc<dyn PlaylistSource>,
    resolver: BoundedResolver,
}

impl PlaylistExporter {
    pub fn new(playlists: Arc<dyn PlaylistSource>, resolver: BoundedResolver) -> Self {
        Self { playlists, resolver }
    }

    pub fn resolver(&self) -> &BoundedResolver {
        &self.resolver
    }

    /// Export one playlist; zero resolved songs is still a success
    pub async fn export(&self, playlist_id: &str) -> Result<ExportResponse, ExportError> {
        let started = Instant::now();

        let playlist = self.playlists.fetch_playlist(playlist_id).await?;
        let queries = extract_queries(playlist.track_items());
        if queries.is_empty() {
            tracing::info!(playlist_id = %playlist_id, "Playlist has no searchable tracks");
            return Err(ExportError::EmptyPlaylist);
        }

        let meta = PlaylistMeta::from_playlist(&playlist);
        let batch = self.resolver.resolve_all(queries).await;

        tracing::info!(
            playlist_id = %playlist_id,
            batch_id = %batch.batch_id,
            songs = batch.resolved_count(),
            queries = batch.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Playlist export finished"
        );

        Ok(assemble(meta, batch, Local::now()))
    }
}
