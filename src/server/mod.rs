// HTTP server - Axum router for the chat front end
// Serves the JSON API, the streamed chat endpoint and optionally the
// front-end build.

pub mod routes;
pub mod streaming;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::chat::ChatService;
use crate::config::PlaylistSettings;
use crate::error::{AppError, Result};

/// Shared state for request handlers
pub struct AppState {
    pub chat: ChatService,
    pub playlist: PlaylistSettings,
    /// Handed to front ends that load the catalog's browser SDK
    pub catalog_app_id: Option<String>,
}

/// Holds the running server's shutdown mechanism
pub struct RunningServer {
    pub shutdown_tx: oneshot::Sender<()>,
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

impl RunningServer {
    /// Signal shutdown and wait for in-flight requests to drain
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            error!("Server task failed: {}", e);
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    // CORS configuration - the chat front end may be served from another origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_origin(HeaderValue::from_static("*"));

    let api_routes = Router::new()
        .merge(routes::api_routes())
        .merge(streaming::chat_routes())
        .with_state(state);

    let app = match static_dir.filter(|p| p.exists()) {
        Some(dir) => {
            info!("Serving front end from {:?}", dir);
            let index = dir.join("index.html");
            api_routes.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)))
        }
        None => api_routes,
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve `app` in a background task.
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<RunningServer> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;
    let actual_addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    info!("Server listening on {}", actual_addr);

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Shutdown signal received, draining connections...");
            })
            .await;
        if let Err(e) = result {
            error!("Server error: {}", e);
        }
        info!("Server stopped");
    });

    Ok(RunningServer {
        shutdown_tx,
        addr: actual_addr,
        handle,
    })
}
