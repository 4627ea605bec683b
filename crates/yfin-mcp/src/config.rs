//! Server configuration
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! JSON file, `YFIN_MCP_*` environment variables, and command-line flags
//! applied by the binary.
//!
//! # Example
//!
//! ```json
//! {
//!   "transport": "sse",
//!   "host": "0.0.0.0",
//!   "port": 8000,
//!   "mountPath": "/finance",
//!   "instructions": "${YFIN_INSTRUCTIONS}"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use yfin_utils::{env_parse, env_string};

use crate::error::MCPError;

/// Name the server reports in `initialize`
pub const DEFAULT_SERVER_NAME: &str = "yahoo_finance_mcp";

/// Instructions the server reports in `initialize`
pub const DEFAULT_INSTRUCTIONS: &str = "You are a Yahoo Finance MCP agent. You can answer questions \
     about stocks, including their price, news and analyst recommendations.";

/// How the server talks to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Long-lived event stream plus a POST endpoint per session
    #[default]
    Sse,
    /// Newline-delimited messages on stdin/stdout
    Stdio,
    /// One POST per message, answered inline
    StreamableHttp,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Sse => "sse",
            Transport::Stdio => "stdio",
            Transport::StreamableHttp => "streamable-http",
        }
    }
}

impl FromStr for Transport {
    type Err = MCPError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" => Ok(Transport::Sse),
            "stdio" => Ok(Transport::Stdio),
            "streamable-http" | "streamable_http" => Ok(Transport::StreamableHttp),
            other => Err(MCPError::ConfigError(format!(
                "unknown transport '{other}' (expected sse, stdio or streamable-http)"
            ))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Server name reported to clients
    pub name: String,

    /// Instructions reported to clients
    pub instructions: String,

    /// Transport to serve on
    pub transport: Transport,

    /// Bind host for HTTP transports
    pub host: String,

    /// Bind port for HTTP transports
    pub port: u16,

    /// Prefix for every HTTP route, empty or starting with `/`
    pub mount_path: String,

    /// Queued messages per session and direction
    pub channel_capacity: usize,

    /// Interval between SSE keep-alive comments
    pub keep_alive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            transport: Transport::default(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            mount_path: String::new(),
            channel_capacity: 32,
            keep_alive_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file
    ///
    /// String values may reference environment variables as `${VAR}` or `$VAR`.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, MCPError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MCPError::ConfigError(format!("Failed to read config file: {e}")))?;

        let mut config: ServerConfig = serde_json::from_str(&content)
            .map_err(|e| MCPError::ConfigError(format!("Failed to parse config file: {e}")))?;

        config.resolve_env_vars()?;
        config.normalize();
        Ok(config)
    }

    /// Override fields from `YFIN_MCP_HOST`, `YFIN_MCP_PORT` and `YFIN_MCP_MOUNT_PATH`
    pub fn apply_env(&mut self) -> Result<(), MCPError> {
        if let Some(host) = env_string("YFIN_MCP_HOST") {
            self.host = host;
        }
        if let Some(port) = env_parse::<u16>("YFIN_MCP_PORT")? {
            self.port = port;
        }
        if let Some(mount_path) = env_string("YFIN_MCP_MOUNT_PATH") {
            self.mount_path = mount_path;
        }
        self.normalize();
        Ok(())
    }

    /// Resolve `${VAR}` references in string fields
    pub fn resolve_env_vars(&mut self) -> Result<(), MCPError> {
        for value in [
            &mut self.name,
            &mut self.instructions,
            &mut self.host,
            &mut self.mount_path,
        ] {
            *value = resolve_env_string(value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MCPError> {
        if self.name.trim().is_empty() {
            return Err(MCPError::ConfigError("name must not be empty".to_string()));
        }
        if !self.mount_path.is_empty() && !self.mount_path.starts_with('/') {
            return Err(MCPError::ConfigError(format!(
                "mount path must start with '/': {}",
                self.mount_path
            )));
        }
        if self.channel_capacity == 0 {
            return Err(MCPError::ConfigError(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }
        if self.keep_alive_secs == 0 {
            return Err(MCPError::ConfigError(
                "keep_alive_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Strip trailing slashes from the mount path
    pub fn normalize(&mut self) {
        let trimmed = self.mount_path.trim().trim_end_matches('/');
        self.mount_path = trimmed.to_string();
    }

    /// `host:port` to bind HTTP transports on
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route of the SSE stream
    pub fn sse_path(&self) -> String {
        format!("{}/sse", self.mount_path)
    }

    /// Route clients POST session messages to
    pub fn messages_path(&self) -> String {
        format!("{}/messages/", self.mount_path)
    }

    /// Route of the streamable HTTP endpoint
    pub fn mcp_path(&self) -> String {
        format!("{}/mcp", self.mount_path)
    }
}

/// Resolve environment variable references in strings
///
/// Supports `${VAR}` and `$VAR` syntax.
///
/// # Example
///
/// ```
/// # use yfin_mcp::config::resolve_env_string;
/// unsafe { std::env::set_var("YFIN_DOC_VAR", "test_value") };
/// let result = resolve_env_string("prefix_${YFIN_DOC_VAR}_suffix")?;
/// assert_eq!(result, "prefix_test_value_suffix");
/// # Ok::<(), yfin_mcp::error::MCPError>(())
/// ```
pub fn resolve_env_string(s: &str) -> Result<String, MCPError> {
    let mut result = s.to_string();

    // Pattern for ${VAR} syntax
    let re_braces = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| MCPError::InvalidPattern(e.to_string()))?;

    for cap in re_braces.captures_iter(s) {
        let var_name = &cap[1];
        let value =
            std::env::var(var_name).map_err(|_| MCPError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    // Pattern for $VAR syntax, applied after braces are gone
    let re_simple = regex::Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)")
        .map_err(|e| MCPError::InvalidPattern(e.to_string()))?;

    let snapshot = result.clone();
    for cap in re_simple.captures_iter(&snapshot) {
        let var_name = &cap[1];
        let value =
            std::env::var(var_name).map_err(|_| MCPError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.name, "yahoo_finance_mcp");
        assert_eq!(config.transport, Transport::Sse);
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.sse_path(), "/sse");
        assert_eq!(config.messages_path(), "/messages/");
        assert_eq!(config.mcp_path(), "/mcp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transport_parsing() {
        assert_eq!("sse".parse::<Transport>().unwrap(), Transport::Sse);
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!(
            "streamable-http".parse::<Transport>().unwrap(),
            Transport::StreamableHttp
        );
        assert!("websocket".parse::<Transport>().is_err());
        assert_eq!(Transport::StreamableHttp.to_string(), "streamable-http");
    }

    #[test]
    fn test_mount_path_routes() {
        let mut config = ServerConfig {
            mount_path: "/finance/".to_string(),
            ..ServerConfig::default()
        };
        config.normalize();

        assert_eq!(config.sse_path(), "/finance/sse");
        assert_eq!(config.messages_path(), "/finance/messages/");

        config.mount_path = "finance".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_resolution() {
        unsafe {
            std::env::set_var("YFIN_TEST_VAR", "test_value");
            std::env::set_var("YFIN_ANOTHER_VAR", "another_value");
        }

        let result = resolve_env_string("${YFIN_TEST_VAR}").unwrap();
        assert_eq!(result, "test_value");

        let result = resolve_env_string("prefix_${YFIN_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");

        let result = resolve_env_string("$YFIN_TEST_VAR").unwrap();
        assert_eq!(result, "test_value");

        let result = resolve_env_string("${YFIN_TEST_VAR}_${YFIN_ANOTHER_VAR}").unwrap();
        assert_eq!(result, "test_value_another_value");

        let err = resolve_env_string("${YFIN_SURELY_UNSET_VAR}").unwrap_err();
        assert!(matches!(err, MCPError::EnvVarNotFound(_)));
    }

    #[test]
    fn test_from_file() {
        unsafe {
            std::env::set_var("YFIN_TEST_HOST", "0.0.0.0");
        }
        let path = std::env::temp_dir().join(format!("yfin-mcp-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"transport": "streamable-http", "host": "${{YFIN_TEST_HOST}}", "port": 9100, "mountPath": "/api/"}}"#
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.transport, Transport::StreamableHttp);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert_eq!(config.mount_path, "/api");
        assert_eq!(config.name, DEFAULT_SERVER_NAME);
        assert_eq!(config.keep_alive_secs, 15);
    }
}
