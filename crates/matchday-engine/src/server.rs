//! HTTP server for the analyze function

use crate::function::AnalyzeFunction;
use crate::llm::client::OpenAiClient;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use matchday_adapters::config::{Config, API_KEY_ENV};
use matchday_core::protocol::{Analyzer, API_PATH, FUNCTION_PATH};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const HEALTH_PATH: &str = "/health";

/// Routes for the function. Every method reaches the handler so non-POST
/// requests get the function's own 405 reply.
pub fn router<A: Analyzer + 'static>(function: Arc<AnalyzeFunction<A>>) -> Router {
    Router::new()
        .route(FUNCTION_PATH, any(analyze::<A>))
        .route(API_PATH, any(analyze::<A>))
        .route(HEALTH_PATH, get(health))
        .with_state(function)
        .layer(TraceLayer::new_for_http())
}

async fn analyze<A: Analyzer + 'static>(
    State(function): State<Arc<AnalyzeFunction<A>>>,
    method: Method,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let response = function
        .handle(&method, &body)
        .instrument(info_span!("analyze", %request_id))
        .await;
    (response.status, Json(response.reply)).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Run the HTTP server until Ctrl+C.
pub async fn run(config: &Config) -> Result<()> {
    let client = OpenAiClient::from_config(config)?;
    let variant = client.variant();
    let model = client.model().id().to_string();
    let app = router(Arc::new(AnalyzeFunction::new(client)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;
    info!(%addr, model = %model, ?variant, "analyze function listening");
    info!("  POST http://{}{}", addr, FUNCTION_PATH);
    if Config::api_key().is_none() {
        warn!(
            "{} is not set; requests will fail until it is",
            API_KEY_ENV
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
