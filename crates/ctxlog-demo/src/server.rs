//! Axum HTTP server: router, handlers, graceful shutdown.

use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::Path;
use axum::http::{HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ctxlog::{log_tags, Context, LogTags};

use crate::config::DemoConfig;
use crate::request_tags;

/// Tag key set by the stage handler.
const STAGE_TAG: &str = "stage";

/// Shared application state.
pub struct AppState {
    pub config: DemoConfig,
    /// Context every request is derived from; carries the static tags.
    pub base_ctx: Context,
    pub id_header: HeaderName,
}

impl AppState {
    pub fn new(config: DemoConfig) -> anyhow::Result<Self> {
        let id_header = HeaderName::from_bytes(config.tags.header.as_bytes())
            .with_context(|| format!("invalid tag header name {:?}", config.tags.header))?;

        let mut base_tags = log_tags! { "service" => config.tracing.service_name.as_str() };
        base_tags.extend(config.tags.static_tags.clone());
        let base_ctx = ctxlog::add_tags_to_context(&Context::background(), base_tags);

        Ok(Self {
            config,
            base_ctx,
            id_header,
        })
    }
}

/// Build the router with the tagging middleware applied to every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/tags", get(handle_tags))
        .route("/tags/{stage}", get(handle_stage))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_tags::tag_request,
        ))
        .with_state(state)
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "ctxlog demo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ctxlog demo shut down gracefully");
    Ok(())
}

/// Tags of the current request.
async fn handle_tags() -> Json<LogTags> {
    Json(ctxlog::current_tags().unwrap_or_default())
}

/// Tag the current request with `stage` and run a nested step under it.
///
/// A `stage` already on the request (e.g. from static tags) is kept.
async fn handle_stage(Path(stage): Path<String>) -> Json<LogTags> {
    let ctx = ctxlog::with_log_tag_with_value(&Context::current(), STAGE_TAG, stage);
    ctx.scope(async {
        process_stage();
        Json(ctxlog::current_tags().unwrap_or_default())
    })
    .await
}

/// Nested step: reads its tags from the ambient context, not from arguments.
fn process_stage() {
    let ctx = Context::current();
    let _span = ctxlog_tracing::tagged_span!(&ctx, "process_stage").entered();
    tracing::info!("Processing stage");
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
