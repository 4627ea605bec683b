//! Stateless HTTP transport: one POST per message, answered inline

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use yfin_stock::MarketDataSource;

use super::shutdown_signal;
use crate::Result;
use crate::config::ServerConfig;
use crate::server::{McpServer, parse_error};

/// Build the single-route router
pub fn streamable_http_router<S>(server: Arc<McpServer<S>>, config: &ServerConfig) -> Router
where
    S: MarketDataSource + 'static,
{
    Router::new()
        .route(&config.mcp_path(), post(handle_post::<S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serve the streamable HTTP transport until Ctrl-C
pub async fn serve_streamable_http<S>(server: Arc<McpServer<S>>, config: &ServerConfig) -> Result<()>
where
    S: MarketDataSource + 'static,
{
    let router = streamable_http_router(server, config);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        path = %config.mcp_path(),
        "Serving MCP over streamable HTTP"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn handle_post<S>(State(server): State<Arc<McpServer<S>>>, body: Bytes) -> Response
where
    S: MarketDataSource + 'static,
{
    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(parse_error(&e))).into_response(),
    };

    match server.handle_value(message).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
