//! HTTP boundary around the inference pipeline.
//!
//! Artifacts are loaded once before binding; every request shares the same
//! read-only [`InferenceContext`].
pub mod error;
pub mod handlers;
pub mod input;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use mhscore_pipeline::inference::InferenceContext;

use input::ServeConfig;

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<InferenceContext>,
}

impl AppState {
    pub fn new(context: InferenceContext) -> Self {
        AppState {
            context: Arc::new(context),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .with_state(state)
}

pub async fn run_server(config: ServeConfig) -> Result<()> {
    let context = InferenceContext::load(
        &config.model_path,
        &config.encoder_path,
        config.inference.clone(),
    )
    .context("Failed to load model artifacts")?;
    log::info!(
        "Loaded {} model ({} encoders)",
        context.model_name(),
        context.encoders().len()
    );

    let app = create_router(AppState::new(context));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address: {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
