mod chat;
mod config;
mod errors;
mod llm_client;
mod routes;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::composer::{Composer, Entropy, Mode};
use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::search::{JobSearch, SearchClient};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration is read once here and never again per request
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Search API v{}", env!("CARGO_PKG_VERSION"));

    let composer = build_composer(&config)?;
    info!("Operating mode: {}", composer.mode().as_str());

    let state = AppState {
        composer: Arc::new(composer),
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

/// Wires the configured collaborators into the composer.
fn build_composer(config: &Config) -> Result<Composer> {
    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini {
        Some(gemini) => {
            let llm = LlmClient::new(
                gemini.api_key.clone(),
                gemini.model.clone(),
                gemini.api_base.clone(),
            )?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(llm))
        }
        None => {
            info!("GEMINI_API_KEY not set; answers use canned listings");
            None
        }
    };

    let search: Option<Arc<dyn JobSearch>> = match &config.elastic {
        Some(elastic) => {
            let client = SearchClient::new(
                elastic.url.clone(),
                elastic.index.clone(),
                elastic.api_key.clone(),
            )?;
            info!("Search client initialized (index: {})", client.index());
            Some(Arc::new(client))
        }
        None => None,
    };

    let entropy = config
        .fallback_seed
        .map(Entropy::Seeded)
        .unwrap_or_default();

    let composer = Composer::new(search, generator)
        .with_entropy(entropy)
        .with_generation_timeout(config.generation_timeout);

    if config.elastic.is_some() && composer.mode() == Mode::Fallback {
        warn!("ELASTIC_URL is set but GEMINI_API_KEY is not; the search index will not be used");
    }

    Ok(composer)
}
