// Modules
pub mod ai;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod intent;
pub mod playlist;
pub mod protocol;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use ai::ClaudeClient;
use catalog::DeezerClient;
use chat::ChatService;
use config::AppConfig;
use error::{AppError, Result};
use playlist::PlaylistAssembler;
use server::AppState;

/// Wire the catalog client, assembler and LLM client from configuration
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let catalog = Arc::new(DeezerClient::new(&config.catalog)?);
    let catalog_app_id = catalog.app_id().map(str::to_string);
    let assembler = PlaylistAssembler::new(catalog);

    let llm = match ClaudeClient::new(&config.llm) {
        Ok(client) => {
            info!(model = %client.model(), "LLM narration enabled");
            Some(client)
        }
        Err(e) => {
            warn!("LLM narration disabled: {}", e);
            None
        }
    };

    Ok(AppState {
        chat: ChatService::new(assembler, llm),
        playlist: config.playlist.clone(),
        catalog_app_id,
    })
}

/// Start the service and block until Ctrl-C
pub async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {}", e)))?;

    let state = Arc::new(build_state(&config)?);
    let app = server::build_router(state, config.server.static_dir.clone());
    let running = server::start_server(addr, app).await?;
    info!("Chat front end available at http://{}", running.addr);

    tokio::signal::ctrl_c().await?;
    running.shutdown().await;
    Ok(())
}
