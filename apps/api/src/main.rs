mod config;
mod errors;
mod generation;
mod jobs;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod storage;
mod tailoring;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::{LlmSectionGenerator, SectionGenerator, UnavailableGenerator};
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the section generator
    let generator: Arc<dyn SectionGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            let system_prompt = match &config.system_prompt_path {
                Some(path) => Some(
                    tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("reading system prompt {}", path.display()))?,
                ),
                None => None,
            };
            let llm = LlmClient::new(key.clone(), LlmSettings::from_config(&config))
                .context("building LLM HTTP client")?;
            info!("LLM client initialized (model: {})", llm.model());
            Arc::new(LlmSectionGenerator::new(llm, system_prompt))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; tailoring jobs are disabled");
            Arc::new(UnavailableGenerator)
        }
    };

    let state = AppState::new(config.clone(), generator);
    state
        .library
        .ensure_dirs()
        .await
        .with_context(|| format!("creating data directories under {}", config.data_dir.display()))?;

    if let Err(e) = state.renderer.probe().await {
        warn!("PDF rendering unavailable: {e}");
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
