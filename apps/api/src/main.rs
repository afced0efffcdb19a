mod config;
mod errors;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod storage;
mod tailoring;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, OracleBackend, S3Config};
use crate::llm_client::ollama::OllamaClient;
use crate::llm_client::AnthropicClient;
use crate::render::archive::PdfArchive;
use crate::render::latex::LatexCompiler;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::library::ResumeLibrary;
use crate::storage::redis_store::RedisStore;
use crate::tailoring::scorer::RelevanceOracle;

const OLLAMA_TIMEOUT: Duration = Duration::from_secs(120);

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

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis-backed library
    let redis = redis::Client::open(config.redis_url.clone())?;
    let store = RedisStore::connect(&redis).await?;
    let library = ResumeLibrary::new(Arc::new(store));

    // Initialize relevance oracle
    let oracle = build_oracle(&config).await;
    info!("Relevance oracle initialized (backend: {})", oracle.backend());

    // Initialize LaTeX compiler
    let compiler = Arc::new(LatexCompiler::new(
        config.latex_command.clone(),
        Duration::from_secs(config.compile_timeout_secs),
    ));

    // Initialize optional PDF archive (S3 / MinIO)
    let archive = match &config.s3 {
        Some(s3) => {
            info!("PDF archive enabled (bucket: {})", s3.bucket);
            Some(PdfArchive::new(build_s3_client(s3).await, s3.bucket.clone()))
        }
        None => {
            info!("PDF archive disabled (S3 not configured)");
            None
        }
    };

    let tailoring = config.tailoring();
    info!(
        "Tailoring: {} chars/page, default {} page(s), {} concurrent oracle calls",
        tailoring.chars_per_page, tailoring.default_page_limit, tailoring.scoring_concurrency
    );

    // Build app state
    let state = AppState {
        library,
        oracle,
        compiler,
        archive,
        tailoring,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the browser extension origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the configured backend. A missing Ollama model is logged, not fatal:
/// it can be pulled while the server runs, and every tailor request fails until then.
async fn build_oracle(config: &Config) -> Arc<dyn RelevanceOracle> {
    match (config.oracle_backend, &config.anthropic_api_key) {
        (OracleBackend::Anthropic, Some(key)) => {
            info!("Using Anthropic model {}", llm_client::MODEL);
            Arc::new(AnthropicClient::new(key.clone()))
        }
        _ => {
            let client = OllamaClient::new(
                config.ollama_base_url.clone(),
                config.ollama_model.clone(),
                OLLAMA_TIMEOUT,
            );
            match client.is_model_available().await {
                Ok(true) => info!("Ollama model {} is available", client.model()),
                Ok(false) => warn!(
                    "Ollama model {} is not installed; run `ollama pull {}`",
                    client.model(),
                    client.model()
                ),
                Err(e) => warn!("Ollama not reachable at {}: {e}", config.ollama_base_url),
            }
            Arc::new(client)
        }
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "tailor-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
