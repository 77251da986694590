// REST API routes
// Structured playlist endpoint plus a health probe.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::chat::GeneratedPlaylist;
use crate::error::{AppError, Result};

// ---- Request/Response types ----

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub prompt: String,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub llm_configured: bool,
    pub catalog_app_id: Option<String>,
}

// ---- Route registration ----

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/playlist", post(create_playlist))
}

// ---- Handlers ----

async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.chat.llm_configured(),
        catalog_app_id: state.catalog_app_id.clone(),
    })
}

/// Structured side channel: the playlist without narration
async fn create_playlist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaylistRequest>,
) -> Result<Json<GeneratedPlaylist>> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Prompt cannot be empty".to_string()));
    }

    let count = state.playlist.resolve_count(body.count);
    Ok(Json(state.chat.generate(prompt, count).await))
}
