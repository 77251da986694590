// Sentinel-delimited playlist payload
//
// The chat stream carries the narrated text followed by a JSON object
// between two literal marker lines. Front ends split the stream on these
// markers, so both strings must stay byte-for-byte identical.

use crate::playlist::Track;
use serde::{Deserialize, Serialize};

pub const PLAYLIST_START: &str = "---PLAYLIST_DATA---";
pub const PLAYLIST_END: &str = "---END_PLAYLIST_DATA---";

/// Structured playlist data attached to a chat answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPayload {
    pub title: String,
    pub tracks: Vec<Track>,
}

/// Render the sentinel block appended to the narrated text
pub fn encode_block(payload: &PlaylistPayload) -> serde_json::Result<String> {
    let json = serde_json::to_string(payload)?;
    Ok(format!("\n\n{}\n{}\n{}\n", PLAYLIST_START, json, PLAYLIST_END))
}

/// Split a complete response into narrative text and payload.
///
/// The payload is `None` when the start marker is absent, the end marker is
/// missing (truncated stream) or the JSON does not parse. The narrative is
/// always the text before the start marker, trimmed.
pub fn extract_payload(text: &str) -> (String, Option<PlaylistPayload>) {
    let Some(start) = text.find(PLAYLIST_START) else {
        return (text.trim().to_string(), None);
    };

    let narrative = text[..start].trim().to_string();
    let rest = &text[start + PLAYLIST_START.len()..];

    let payload = rest
        .find(PLAYLIST_END)
        .and_then(|end| serde_json::from_str::<PlaylistPayload>(rest[..end].trim()).ok());

    (narrative, payload)
}
