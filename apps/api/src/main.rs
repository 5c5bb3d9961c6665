mod analysis;
mod auth;
mod config;
mod db;
mod documents;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod posts;
mod resilience;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod testing;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::LinkedInClient;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::documents::{HttpProfileScraper, PdfTextExtractor};
use crate::jobs::JSearchClient;
use crate::llm_client::GeminiClient;
use crate::resilience::{Orchestrator, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LinkBrand API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize generation provider + orchestrator
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.llm_timeout)?;
    let orchestrator = Orchestrator::new(
        Arc::new(gemini),
        config.candidate_models.clone(),
        config.analysis_model.clone(),
        RetryPolicy {
            max_attempts: 3,
            backoff: config.rate_limit_backoff,
        },
        config.llm_timeout,
    );
    info!(
        "Orchestrator initialized (candidates: {}, analysis model: {})",
        config.candidate_models.join(", "),
        config.analysis_model
    );

    // External connectors
    let identity = LinkedInClient::new(&config)?;
    let jobs = JSearchClient::new(config.rapidapi_key.clone(), config.llm_timeout)?;
    if config.rapidapi_key.is_none() {
        warn!("RAPIDAPI_KEY not set; job recommendations will return mock listings");
    }
    let scraper = HttpProfileScraper::new(config.scraper_endpoint.clone(), config.scraper_timeout)?;

    // Build app state
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        orchestrator,
        identity: Arc::new(identity),
        jobs: Arc::new(jobs),
        extractor: Arc::new(PdfTextExtractor),
        scraper: Arc::new(scraper),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_url));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Restricts CORS to the configured frontend; falls back to permissive when
/// the origin is not a valid header value.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            warn!("FRONTEND_URL is not a valid origin; using permissive CORS");
            CorsLayer::permissive()
        }
    }
}
