mod config;
mod curriculum;
mod errors;
mod llm_client;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, GeneratorBackend};
use crate::curriculum::generator::{CurriculumGenerator, HostedGenerator, LocalGenerator};
use crate::llm_client::ollama::OllamaClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing provider credential)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CurricuForge API v{}", env!("CARGO_PKG_VERSION"));

    let generator = build_generator(&config)?;
    info!("Curriculum generator initialized ({} backend)", generator.backend());

    let state = AppState { generator };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the generator selected by `GENERATOR_BACKEND`.
fn build_generator(config: &Config) -> Result<Arc<dyn CurriculumGenerator>> {
    let timeout = Duration::from_secs(config.llm_timeout_secs);

    match config.backend {
        GeneratorBackend::Hosted => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is required for the hosted backend")?;
            let llm = LlmClient::new(api_key, config.openai_base_url.clone(), timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(HostedGenerator::new(llm)))
        }
        GeneratorBackend::Local => {
            let client =
                OllamaClient::new(config.ollama_url.clone(), config.ollama_model.clone(), timeout)?;
            info!(
                "Ollama client initialized (model: {}, url: {})",
                config.ollama_model, config.ollama_url
            );
            Ok(Arc::new(LocalGenerator::new(client)))
        }
    }
}
