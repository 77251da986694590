// Chat orchestration
//
// One request: take the latest user message, parse its intent, assemble a
// playlist, stream the narration and close the stream with the sentinel
// playlist block. The playlist block is emitted even when the model is
// missing or fails.

use crate::ai::{fallback_narration, ClaudeClient, Message, NarrationContext, SYSTEM_PROMPT};
use crate::error::{AppError, Result};
use crate::intent::{self, Intent};
use crate::playlist::{playlist_title, PlaylistAssembler, Track};
use crate::protocol::{encode_block, extract_payload, PlaylistPayload};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Chat message as sent by the front end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "user" or "assistant"
    pub content: String,
}

/// Playlist generated for a single prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlaylist {
    pub intent: Intent,
    pub title: String,
    pub tracks: Vec<Track>,
}

pub struct ChatService {
    assembler: PlaylistAssembler,
    llm: Option<ClaudeClient>,
}

impl ChatService {
    pub fn new(assembler: PlaylistAssembler, llm: Option<ClaudeClient>) -> Self {
        Self { assembler, llm }
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Parse `prompt` and assemble a playlist of at most `count` tracks.
    /// The whole prompt doubles as the context for trigger words.
    pub async fn generate(&self, prompt: &str, count: usize) -> GeneratedPlaylist {
        let intent = intent::parse(prompt);
        info!(
            genre = ?intent.genre,
            mood = ?intent.mood,
            style = ?intent.style,
            count,
            "Generating playlist"
        );

        let tracks = self
            .assembler
            .assemble(intent.genre.as_deref(), intent.mood.as_deref(), count, prompt)
            .await;
        let title = playlist_title(&intent);

        GeneratedPlaylist {
            intent,
            title,
            tracks,
        }
    }

    /// Answer the conversation with a text stream: narration first, then
    /// the sentinel playlist block.
    pub async fn respond(
        &self,
        history: &[ChatMessage],
        count: usize,
    ) -> Result<BoxStream<'static, String>> {
        let (prompt, earlier) = split_last_user(history)
            .ok_or_else(|| AppError::BadRequest("No user message to answer".to_string()))?;

        let playlist = self.generate(prompt, count).await;
        let payload = PlaylistPayload {
            title: playlist.title.clone(),
            tracks: playlist.tracks.clone(),
        };
        let block = encode_block(&payload)
            .map_err(|e| AppError::Internal(format!("Failed to encode playlist: {}", e)))?;

        let narration = self.narrate(prompt, earlier, &playlist).await;
        Ok(narration.chain(stream::once(future::ready(block))).boxed())
    }

    async fn narrate(
        &self,
        prompt: &str,
        earlier: &[ChatMessage],
        playlist: &GeneratedPlaylist,
    ) -> BoxStream<'static, String> {
        let Some(llm) = &self.llm else {
            return canned(playlist);
        };

        let context = NarrationContext::new(prompt, &playlist.intent, &playlist.title, &playlist.tracks);
        let user_message = match context.to_user_message() {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to build narration context");
                return canned(playlist);
            }
        };

        let mut messages = conversation(earlier);
        messages.push(Message::user(user_message));

        match llm.chat_stream(&messages, Some(SYSTEM_PROMPT)).await {
            Ok(text) => text
                .scan((), |_, item| {
                    future::ready(match item {
                        Ok(delta) => Some(delta),
                        Err(e) => {
                            warn!(error = %e, "Narration stream interrupted");
                            None
                        }
                    })
                })
                .boxed(),
            Err(e) => {
                warn!(error = %e, "Narration unavailable, using canned text");
                canned(playlist)
            }
        }
    }
}

fn canned(playlist: &GeneratedPlaylist) -> BoxStream<'static, String> {
    let text = fallback_narration(&playlist.title, playlist.tracks.len());
    stream::once(future::ready(text)).boxed()
}

/// Latest non-empty user message and everything said before it
fn split_last_user(history: &[ChatMessage]) -> Option<(&str, &[ChatMessage])> {
    let idx = history
        .iter()
        .rposition(|m| m.role == "user" && !m.content.trim().is_empty())?;
    Some((history[idx].content.trim(), &history[..idx]))
}

/// Earlier turns as model messages. Playlist blocks are stripped from
/// assistant turns and the history starts with a user turn.
fn conversation(earlier: &[ChatMessage]) -> Vec<Message> {
    earlier
        .iter()
        .filter_map(|m| match m.role.as_str() {
            "user" => Some(Message::user(m.content.trim())),
            "assistant" => Some(Message::assistant(extract_payload(&m.content).0)),
            _ => None,
        })
        .filter(|m| !m.content.is_empty())
        .skip_while(|m| m.role != "user")
        .collect()
}
