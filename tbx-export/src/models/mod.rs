//! Data models for tbx-export
//!
//! - Resolution: queries, search hits, detail records and per-query outcomes
//! - Playlist: raw playlist payload as returned by the playlist provider
//! - Export: response body handed back to the caller

pub mod export;
pub mod playlist;
pub mod resolution;

pub use export::{ExportResponse, ExportedPlaylist, PlaylistMeta};
pub use playlist::{RawArtist, RawImage, RawPlaylist, RawTrack, RawTrackItem, RawTrackPage};
pub use resolution::{
    BatchCompletion, DetailRecord, IndexedOutcome, LookupError, LookupStage, Query,
    ResolutionBatch, ResolutionOutcome, SearchHit, UnresolvedReason,
};
