// Music catalog boundary
//
// The assembler only sees the `CatalogSearch` capability. The concrete
// Deezer client lives in `deezer`; tests substitute their own stubs.

pub mod deezer;

use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use deezer::DeezerClient;

/// Track as returned by the catalog search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: i64,
    pub title: String,
    pub artist: CatalogArtist,
    #[serde(default)]
    pub album: Option<CatalogAlbum>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAlbum {
    pub title: String,
}

/// Search response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<CatalogTrack>,
}

/// Catalog search capability.
///
/// Transport failures (network errors, non-2xx statuses, timeouts, malformed
/// payloads) must be absorbed and reported as `Ok(vec![])`. An `Err` means an
/// internal fault and sends the assembler down its static fallback path.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogTrack>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_payload() {
        let json = r#"{
            "data": [{
                "id": 3135556,
                "title": "Harder, Better, Faster, Stronger",
                "artist": {"id": 27, "name": "Daft Punk"},
                "album": {"id": 302127, "title": "Discovery"},
                "preview": "https://cdns-preview.example/3135556.mp3",
                "duration": 224,
                "rank": 956167
            }],
            "total": 1
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 1);
        let track = &response.data[0];
        assert_eq!(track.id, 3135556);
        assert_eq!(track.artist.name, "Daft Punk");
        assert_eq!(track.album.as_ref().map(|a| a.title.as_str()), Some("Discovery"));
        assert_eq!(track.duration, Some(224));
    }

    #[test]
    fn test_deserialize_error_payload_has_no_tracks() {
        let json = r#"{"error": {"type": "Exception", "message": "Quota limit exceeded", "code": 4}}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.data.is_empty());
    }
}
