//! Raw playlist payload from the playlist provider
//!
//! Only the fields the exporter reads are modelled. Everything is optional
//! because removed or unavailable tracks come back with `null` entries.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlaylist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<RawImage>>,
    #[serde(default)]
    pub tracks: Option<RawTrackPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackPage {
    #[serde(default)]
    pub items: Option<Vec<RawTrackItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackItem {
    /// Absent for tracks that were removed or are unavailable
    #[serde(default)]
    pub track: Option<RawTrack>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<RawArtist>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawPlaylist {
    /// URL of the first cover image, if any
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .as_deref()
            .and_then(|images| images.first())
            .and_then(|image| image.url.as_deref())
    }

    pub fn track_items(&self) -> &[RawTrackItem] {
        self.tracks
            .as_ref()
            .and_then(|page| page.items.as_deref())
            .unwrap_or(&[])
    }
}

impl RawTrack {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists
            .as_deref()
            .and_then(|artists| artists.first())
            .and_then(|artist| artist.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_provider_payload_with_nulls() {
        let playlist: RawPlaylist = serde_json::from_str(
            r#"{
                "name": "Road Trip",
                "images": [{"url": "https://img.example/cover.jpg", "height": 640}],
                "tracks": {
                    "total": 2,
                    "items": [
                        {"track": {"name": "Song", "artists": [{"name": "Band"}, {"name": "Guest"}]}},
                        {"track": null}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(playlist.name.as_deref(), Some("Road Trip"));
        assert_eq!(playlist.cover_image(), Some("https://img.example/cover.jpg"));
        assert_eq!(playlist.track_items().len(), 2);
        assert!(playlist.track_items()[1].track.is_none());

        let first = playlist.track_items()[0].track.as_ref().unwrap();
        assert_eq!(first.primary_artist(), Some("Band"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let playlist: RawPlaylist = serde_json::from_str(r#"{"images": null}"#).unwrap();

        assert!(playlist.name.is_none());
        assert!(playlist.cover_image().is_none());
        assert!(playlist.track_items().is_empty());
    }
}
