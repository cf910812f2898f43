mod config;
mod errors;
mod gateway;
mod jobs;
mod models;
mod photo;
mod render;
mod routes;
mod session;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::{GeminiClient, GeminiGateway};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobPilot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize AI gateway
    let client = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_api_url.clone());
    let gateway = Arc::new(GeminiGateway::new(client));
    info!("AI gateway initialized (model: {})", gateway::MODEL);

    let sessions = SessionStore::new();
    sessions.spawn_sweeper(Duration::from_secs(config.session_ttl_secs));
    info!("Idle sessions expire after {}s", config.session_ttl_secs);

    let state = AppState {
        sessions,
        gateway,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
