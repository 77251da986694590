// Narration context for the LLM
//
// Condenses the assembled playlist into a compact JSON document the model
// narrates from, and provides the canned text used when no model answers.

use crate::intent::Intent;
use crate::playlist::{Track, TrackTag};
use serde::Serialize;

/// Condensed track representation for AI context
#[derive(Debug, Serialize)]
pub struct TrackContext<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<&'a str>,
    pub origin: TrackTag,
}

/// Complete context sent to the model
#[derive(Debug, Serialize)]
pub struct NarrationContext<'a> {
    pub request: &'a str,
    pub intent: &'a Intent,
    pub title: &'a str,
    pub tracks: Vec<TrackContext<'a>>,
}

impl<'a> NarrationContext<'a> {
    pub fn new(request: &'a str, intent: &'a Intent, title: &'a str, tracks: &'a [Track]) -> Self {
        Self {
            request,
            intent,
            title,
            tracks: tracks
                .iter()
                .map(|track| TrackContext {
                    title: &track.title,
                    artist: &track.artist,
                    album: track.album.as_deref(),
                    origin: track.tag,
                })
                .collect(),
        }
    }

    /// User message carrying the request and the selected tracks
    pub fn to_user_message(&self) -> serde_json::Result<String> {
        let context = serde_json::to_string_pretty(self)?;
        Ok(format!(
            "Demande : {}\n\nPlaylist préparée :\n{}\n\nPrésente cette playlist.",
            self.request, context
        ))
    }
}

/// Text used when the model is unavailable
pub fn fallback_narration(title: &str, track_count: usize) -> String {
    match track_count {
        0 => format!(
            "Je n'ai trouvé aucun morceau pour « {} » cette fois-ci. Essaie une autre formulation !",
            title
        ),
        1 => format!("Voici « {} » : un morceau choisi pour toi.", title),
        n => format!("Voici « {} » : {} morceaux choisis pour toi. Bonne écoute !", title, n),
    }
}
