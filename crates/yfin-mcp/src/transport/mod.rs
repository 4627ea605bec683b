//! Transports carrying MCP messages to and from clients

pub mod sse;
pub mod stdio;
pub mod streamable_http;

pub use sse::{serve_sse, sse_router};
pub use stdio::{serve_lines, serve_stdio};
pub use streamable_http::{serve_streamable_http, streamable_http_router};

use tracing::{info, warn};

/// Resolve when the process receives Ctrl-C
pub(crate) async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
