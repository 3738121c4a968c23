use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use model_admin::api::rest::routes;
use model_admin::infra::auth::UserDirectory;
use model_admin::AdminRegistry;
use runtime::ServerConfig;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use crate::{auth, request_id, trace};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT: usize = 16 * 1024 * 1024;

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Admin routes plus `/health`, wrapped in the request pipeline.
///
/// Layers run outermost first: set request id, propagate it to the
/// response, open the admin span, timeout, body limit, resolve the acting
/// user.
pub fn build_router(registry: &AdminRegistry, users: Arc<UserDirectory>, timeout: Duration) -> Router {
    let x_request_id = request_id::header();

    routes::router(registry)
        .route("/health", get(health_check))
        .layer(from_fn_with_state(users, auth::resolve_user))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TimeoutLayer::new(timeout))
        .layer(trace::layer(registry))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, request_id::UuidRequestId))
}

/// Zero means "use the default".
pub fn request_timeout(server: &ServerConfig) -> Duration {
    match server.timeout_sec {
        0 => DEFAULT_TIMEOUT,
        secs => Duration::from_secs(secs),
    }
}

/// Bind, then serve until SIGINT/SIGTERM.
pub async fn serve(server: &ServerConfig, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("failed to bind address {}:{}", server.host, server.port))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server bound");

    axum::serve(listener, router)
        .with_graceful_shutdown(modkit::runtime::shutdown_signal())
        .await
        .context("HTTP server failed")?;
    tracing::info!("HTTP server stopped");
    Ok(())
}
