//! Final response assembly

use chrono::{DateTime, Local};

use crate::models::{ExportResponse, ExportedPlaylist, PlaylistMeta, ResolutionBatch};
use tbx_common::time::format_generated_at;

const PLAYLIST_KIND: &str = "playlist";

/// Wrap the resolved records of `batch` with playlist display metadata
pub fn assemble(meta: PlaylistMeta, batch: ResolutionBatch, generated_at: DateTime<Local>) -> ExportResponse {
    ExportResponse {
        success: true,
        data: ExportedPlaylist {
            name: meta.name,
            kind: PLAYLIST_KIND.to_string(),
            year: format_generated_at(generated_at),
            image: meta.image,
            songs: batch.into_resolved(),
        },
    }
}
