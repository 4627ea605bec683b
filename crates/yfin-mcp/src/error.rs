//! Error types for MCP operations

use thiserror::Error;

use rmcp::model::{ErrorCode, ErrorData};

/// Errors that can occur while serving MCP requests
#[derive(Error, Debug)]
pub enum MCPError {
    /// Message body is not valid JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Valid JSON that is not a JSON-RPC request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request names a method this server does not implement
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Malformed method parameters
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Tool call without a required argument
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Tool call naming a tool outside the fixed set
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No open session with this id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Transport failure
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable error
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Invalid pattern error
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MCPError {
    /// JSON-RPC error code reported for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            MCPError::ParseError(_) => ErrorCode::PARSE_ERROR,
            MCPError::InvalidRequest(_) => ErrorCode::INVALID_REQUEST,
            MCPError::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            MCPError::InvalidParams(_)
            | MCPError::MissingArgument(_)
            | MCPError::UnknownTool(_) => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// JSON-RPC error object for this error
    pub fn to_rpc_error(&self) -> ErrorData {
        ErrorData::new(self.code(), self.to_string(), None)
    }
}

impl From<yfin_utils::ConfigError> for MCPError {
    fn from(err: yfin_utils::ConfigError) -> Self {
        MCPError::ConfigError(err.to_string())
    }
}
