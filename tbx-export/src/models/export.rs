//! Response body returned for an exported playlist

use serde::Serialize;

use super::{DetailRecord, RawPlaylist};

/// Playlist-level display metadata carried into the response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistMeta {
    pub name: Option<String>,
    pub image: Option<String>,
}

impl PlaylistMeta {
    pub fn from_playlist(playlist: &RawPlaylist) -> Self {
        Self {
            name: playlist.name.clone(),
            image: playlist.cover_image().map(str::to_string),
        }
    }
}

/// Top-level response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: ExportedPlaylist,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedPlaylist {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Generation timestamp (`%Y-%m-%d %H:%M:%S`, local time)
    pub year: String,
    pub image: Option<String>,
    pub songs: Vec<DetailRecord>,
}
