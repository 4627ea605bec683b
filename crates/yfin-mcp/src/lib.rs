//! Model Context Protocol (MCP) server for the Yahoo Finance stock tools
//!
//! This crate serves the six `yfin-stock` lookups to MCP clients:
//! - JSON-RPC 2.0 envelopes around the `rmcp` model types ([`protocol`])
//! - A stateless dispatcher routing `tools/list` and `tools/call` ([`McpServer`])
//! - Per-connection sessions with in-order processing ([`SessionManager`])
//! - SSE, stdio and streamable HTTP transports ([`transport`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use yfin_mcp::{McpServer, ServerConfig, transport};
//! use yfin_stock::{YahooFinanceClient, YahooStockTools};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let tools = YahooStockTools::new(YahooFinanceClient::from_env()?);
//! let server = Arc::new(McpServer::from_config(tools, &config));
//!
//! transport::serve_sse(server, &config).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use config::{ServerConfig, Transport};
pub use error::MCPError;
pub use server::McpServer;
pub use session::{Session, SessionManager};

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, MCPError>;
