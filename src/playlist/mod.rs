// Playlist generation
//
// - Query fan-out from intent and context (`queries`)
// - Sequential catalog fetch, dedup, backfill and shuffle (`assembler`)
// - Static fallback tracks for internal failures (`fallback`)

pub mod assembler;
pub mod fallback;
pub mod queries;

use crate::catalog::CatalogTrack;
use crate::intent::Intent;
use serde::{Deserialize, Serialize};

pub use assembler::PlaylistAssembler;

/// Where a track came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackTag {
    /// Found through an intent-derived query
    Search,
    /// Found through a trending/top-hits query or the backfill
    Popular,
}

/// Playlist entry sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub album: Option<String>,
    #[serde(rename = "previewUrl", skip_serializing_if = "Option::is_none", default)]
    pub preview_url: Option<String>,
    pub tag: TrackTag,
}

impl Track {
    pub fn from_catalog(track: CatalogTrack, tag: TrackTag) -> Self {
        Track {
            id: track.id,
            title: track.title,
            artist: track.artist.name,
            album: track.album.map(|a| a.title),
            preview_url: track.preview.filter(|url| !url.is_empty()),
            tag,
        }
    }
}

/// Display title derived from the parsed intent
pub fn playlist_title(intent: &Intent) -> String {
    let words: Vec<&str> = [&intent.genre, &intent.mood, &intent.style]
        .into_iter()
        .filter_map(|word| word.as_deref())
        .collect();

    if words.is_empty() {
        "Ma playlist".to_string()
    } else {
        format!("Playlist {}", words.join(" "))
    }
}
