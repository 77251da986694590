// Streamed chat endpoint
// - Accepts the front end's message list (or a bare prompt)
// - Streams narration as plain text, closed by the sentinel playlist block

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Response},
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

use super::AppState;
use crate::chat::ChatMessage;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Single-shot form used by simple clients
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
}

impl ChatRequest {
    fn into_history(self) -> Vec<ChatMessage> {
        let mut messages = self.messages;
        if let Some(prompt) = self.prompt {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: prompt,
            });
        }
        messages
    }
}

pub fn chat_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/chat", post(chat))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Response<Body>> {
    let count = state.playlist.resolve_count(body.count);
    let history = body.into_history();

    let text = state.chat.respond(&history, count).await?;
    let body = Body::from_stream(text.map(Ok::<_, Infallible>));

    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}
