//! Server-sent events transport
//!
//! `GET {mount}/sse` opens a session and streams its responses;
//! `POST {mount}/messages/?session_id=<id>` pushes one message into it.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;
use yfin_stock::MarketDataSource;

use super::shutdown_signal;
use crate::Result;
use crate::config::ServerConfig;
use crate::server::McpServer;
use crate::session::{Session, SessionManager};

struct SseState<S> {
    server: Arc<McpServer<S>>,
    sessions: Arc<SessionManager>,
    messages_path: String,
    keep_alive: Duration,
}

impl<S> Clone for SseState<S> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
            sessions: Arc::clone(&self.sessions),
            messages_path: self.messages_path.clone(),
            keep_alive: self.keep_alive,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: Option<String>,
}

/// Build the two-route SSE router
pub fn sse_router<S>(
    server: Arc<McpServer<S>>,
    sessions: Arc<SessionManager>,
    config: &ServerConfig,
) -> Router
where
    S: MarketDataSource + 'static,
{
    let state = SseState {
        server,
        sessions,
        messages_path: config.messages_path(),
        keep_alive: Duration::from_secs(config.keep_alive_secs),
    };

    Router::new()
        .route(&config.sse_path(), get(open_stream::<S>))
        .route(&config.messages_path(), post(post_message::<S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the SSE transport until Ctrl-C
pub async fn serve_sse<S>(server: Arc<McpServer<S>>, config: &ServerConfig) -> Result<()>
where
    S: MarketDataSource + 'static,
{
    let sessions = Arc::new(SessionManager::new(config.channel_capacity));
    let router = sse_router(server, Arc::clone(&sessions), config);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        sse = %config.sse_path(),
        messages = %config.messages_path(),
        "Serving MCP over SSE"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // open event streams end once their sessions are gone
            sessions.close_all();
        })
        .await?;

    Ok(())
}

async fn open_stream<S>(
    State(state): State<SseState<S>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>
where
    S: MarketDataSource + 'static,
{
    let session = state.sessions.open(Arc::clone(&state.server));
    let endpoint = format!(
        "{}?session_id={}",
        state.messages_path,
        session.id().simple()
    );

    let first = stream::once(async move { Ok(Event::default().event("endpoint").data(endpoint)) });
    let responses = stream::unfold(session, |mut session: Session| async move {
        let response = session.next_response().await?;
        let event = match serde_json::to_string(&response) {
            Ok(json) => Event::default().event("message").data(json),
            Err(e) => {
                warn!(session = %session.id(), error = %e, "Failed to encode response");
                Event::default().comment("unencodable response dropped")
            }
        };
        Some((Ok(event), session))
    });

    Sse::new(first.chain(responses)).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

async fn post_message<S>(
    State(state): State<SseState<S>>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response
where
    S: MarketDataSource + 'static,
{
    let Some(raw_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "session_id is required").into_response();
    };
    let Ok(session_id) = Uuid::parse_str(&raw_id) else {
        return (StatusCode::BAD_REQUEST, "Invalid session ID").into_response();
    };
    if !state.sessions.contains(session_id) {
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    }

    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(session = %session_id, error = %e, "Rejected malformed message");
            return (StatusCode::BAD_REQUEST, "Could not parse message").into_response();
        }
    };

    match state.sessions.deliver(session_id, message).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}
