//! Query extraction from raw playlist tracks
//!
//! One query per available track: the track name up to its first `(`
//! (dropping "(feat. ..)"/"(Remastered)" style suffixes) followed by the
//! primary artist. Removed or unavailable tracks are skipped; duplicates are
//! kept.

use crate::models::{Query, RawTrack, RawTrackItem};

/// Build the ordered query list for a playlist's track items
pub fn extract_queries(items: &[RawTrackItem]) -> Vec<Query> {
    items
        .iter()
        .filter_map(|item| item.track.as_ref())
        .filter_map(track_query)
        .collect()
}

/// Normalized query for one track, `None` if nothing searchable remains
pub fn track_query(track: &RawTrack) -> Option<Query> {
    let name = track
        .name
        .as_deref()
        .unwrap_or_default()
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();
    let artist = track.primary_artist().unwrap_or_default().trim();

    let text = match (name.is_empty(), artist.is_empty()) {
        (true, true) => return None,
        (false, true) => name.to_string(),
        (true, false) => artist.to_string(),
        (false, false) => format!("{} {}", name, artist),
    };

    Some(Query::new(text))
}
