//! Request dispatcher
//!
//! [`McpServer`] owns no per-connection state: every transport feeds it one
//! message at a time and writes back whatever response it returns.

use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};
use yfin_stock::{MarketDataSource, StockTool, StockTools, TICKER_ARG};

use crate::Result;
use crate::config::{DEFAULT_INSTRUCTIONS, DEFAULT_SERVER_NAME, ServerConfig};
use crate::error::MCPError;
use crate::protocol::{
    CallToolResult, Content, Implementation, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, Tool, ToolsCapability, methods,
    negotiate_protocol_version,
};

/// MCP server over the six stock tools
pub struct McpServer<S> {
    name: String,
    instructions: String,
    tools: StockTools<S>,
}

impl<S: MarketDataSource> McpServer<S> {
    pub fn new(tools: StockTools<S>) -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            tools,
        }
    }

    /// Take name and instructions from the configuration
    pub fn from_config(tools: StockTools<S>, config: &ServerConfig) -> Self {
        Self {
            name: config.name.clone(),
            instructions: config.instructions.clone(),
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The six tool descriptors, always in the same order
    pub fn list_tools(&self) -> Vec<Tool> {
        StockTool::ALL
            .into_iter()
            .map(|tool| {
                let schema = match tool.input_schema() {
                    Value::Object(schema) => schema,
                    _ => Map::new(),
                };
                Tool::new(tool.as_str(), tool.description(), Arc::new(schema))
            })
            .collect()
    }

    /// Run a tool
    ///
    /// The ticker is checked before the tool name. Upstream failures become an
    /// `isError` result rather than a protocol error.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<CallToolResult> {
        let ticker = arguments
            .and_then(|args| args.get(TICKER_ARG))
            .and_then(Value::as_str)
            .ok_or_else(|| MCPError::MissingArgument(TICKER_ARG.to_string()))?;

        let tool: StockTool = name
            .parse()
            .map_err(|_| MCPError::UnknownTool(name.to_string()))?;

        match self.tools.run(tool, ticker).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                warn!(tool = %tool, ticker = %ticker, error = %e, "Stock lookup failed");
                let text = format!("Error: {e}");
                Ok(CallToolResult::error(vec![Content::text(text)]))
            }
        }
    }

    fn initialize(&self, params: &Value) -> InitializeResult {
        InitializeResult {
            protocol_version: negotiate_protocol_version(params.get("protocolVersion")),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..ServerCapabilities::default()
            },
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(self.instructions.clone()),
        }
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        match request.method.as_str() {
            methods::INITIALIZE => Ok(serde_json::to_value(self.initialize(&request.params))?),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => Ok(serde_json::to_value(ListToolsResult::with_all_items(
                self.list_tools(),
            ))?),
            methods::TOOLS_CALL => {
                let name = request
                    .params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| MCPError::InvalidParams("missing tool name".to_string()))?;
                let arguments = request.params.get("arguments").and_then(Value::as_object);
                let result = self.call_tool(name, arguments).await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(MCPError::MethodNotFound(other.to_string())),
        }
    }

    /// Handle one decoded request; notifications yield no response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "Dispatching message");

        let Some(id) = request.id.clone() else {
            if request.method != methods::INITIALIZED {
                debug!(method = %request.method, "Ignoring notification");
            }
            return None;
        };

        Some(match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!(method = %request.method, error = %e, "Rejected request");
                JsonRpcResponse::failure(id, e.to_rpc_error())
            }
        })
    }

    /// Handle one JSON value received from a transport
    ///
    /// Responses sent by the client (objects without `method`) are ignored.
    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let Some(object) = value.as_object() else {
            return Some(invalid_request(Value::Null, "expected a JSON object"));
        };

        if !object.contains_key("method") {
            if object.contains_key("result") || object.contains_key("error") {
                return None;
            }
            let id = object.get("id").cloned().unwrap_or(Value::Null);
            return Some(invalid_request(id, "missing method"));
        }

        let id = object.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) if request.jsonrpc == crate::protocol::JSONRPC_VERSION => {
                self.handle_request(request).await
            }
            Ok(request) => Some(invalid_request(
                id,
                &format!("unsupported jsonrpc version '{}'", request.jsonrpc),
            )),
            Err(e) => Some(invalid_request(id, &e.to_string())),
        }
    }

    /// Handle one raw message
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => Some(parse_error(&e)),
        }
    }
}

/// Response for a body that is not JSON
pub fn parse_error(err: &serde_json::Error) -> JsonRpcResponse {
    let err = MCPError::ParseError(err.to_string());
    warn!(error = %err, "Rejected message");
    JsonRpcResponse::failure(Value::Null, err.to_rpc_error())
}

fn invalid_request(id: Value, reason: &str) -> JsonRpcResponse {
    let err = MCPError::InvalidRequest(reason.to_string());
    warn!(error = %err, "Rejected message");
    JsonRpcResponse::failure(id, err.to_rpc_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use yfin_stock::{
        CompanyInfo, FinancialStatement, RecommendationTrend, StatementKind, StockError,
    };

    /// Source answering every lookup with fixed data, or failing for `FAIL`
    struct StaticSource;

    fn fail_for(ticker: &str) -> yfin_stock::Result<()> {
        if ticker == "FAIL" {
            Err(StockError::YahooFinanceError("HTTP 500".to_string()))
        } else {
            Ok(())
        }
    }

    #[async_trait]
    impl MarketDataSource for StaticSource {
        async fn balance_sheet(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            fail_for(ticker)?;
            Ok(FinancialStatement::empty(ticker, StatementKind::BalanceSheet))
        }

        async fn cash_flow(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            Ok(FinancialStatement::empty(ticker, StatementKind::CashFlow))
        }

        async fn income_statement(&self, ticker: &str) -> yfin_stock::Result<FinancialStatement> {
            Ok(FinancialStatement::empty(ticker, StatementKind::IncomeStatement))
        }

        async fn info(&self, ticker: &str) -> yfin_stock::Result<CompanyInfo> {
            let mut info = CompanyInfo::new();
            info.insert("symbol", json!(ticker));
            Ok(info)
        }

        async fn recommendations(
            &self,
            _ticker: &str,
        ) -> yfin_stock::Result<Vec<RecommendationTrend>> {
            Ok(Vec::new())
        }

        async fn news(&self, _ticker: &str) -> yfin_stock::Result<Vec<Value>> {
            Ok(vec![json!({"content": {"title": "Headline"}})])
        }
    }

    fn server() -> McpServer<StaticSource> {
        McpServer::new(StockTools::new(StaticSource))
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_list_tools_is_stable() {
        let server = server();
        let names: Vec<String> = server
            .list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, StockTool::names());

        let again: Vec<String> = server
            .list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, again);

        let schema = serde_json::to_value(&server.list_tools()[0]).unwrap();
        assert_eq!(schema["inputSchema"]["required"], json!(["ticker"]));
    }

    #[tokio::test]
    async fn test_call_tool_labels() {
        let server = server();
        let aapl = args(json!({"ticker": "AAPL"}));

        let result = server.call_tool("balance_sheet", Some(&aapl)).await.unwrap();
        assert!(text_of(&result).starts_with("Balance Sheet:\n"));
        assert_ne!(result.is_error, Some(true));

        let msft = args(json!({"ticker": "MSFT"}));
        let result = server
            .call_tool("analyst_recommendations", Some(&msft))
            .await
            .unwrap();
        assert!(text_of(&result).starts_with("Recommendations:\n"));
    }

    #[tokio::test]
    async fn test_call_tool_missing_ticker() {
        let server = server();
        let empty = Map::new();
        for tool in StockTool::names() {
            let err = server.call_tool(tool, Some(&empty)).await.unwrap_err();
            assert!(matches!(err, MCPError::MissingArgument(ref arg) if arg == "ticker"));
        }
        let err = server.call_tool("cash_flow", None).await.unwrap_err();
        assert!(matches!(err, MCPError::MissingArgument(_)));

        // Ticker is checked before the name
        let err = server.call_tool("not_a_real_tool", Some(&empty)).await.unwrap_err();
        assert!(matches!(err, MCPError::MissingArgument(_)));
    }

    #[tokio::test]
    async fn test_call_tool_unknown_name() {
        let err = server()
            .call_tool("not_a_real_tool", Some(&args(json!({"ticker": "AAPL"}))))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not_a_real_tool"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_error_result() {
        let result = server()
            .call_tool("balance_sheet", Some(&args(json!({"ticker": "FAIL"}))))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Error: Yahoo Finance error: HTTP 500");
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#,
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "yahoo_finance_mcp");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(result["instructions"].as_str().unwrap().contains("Yahoo Finance"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server();

        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code.0, -32700);
        assert_eq!(response.id, Value::Null);

        let response = server.handle_message(r#"{"jsonrpc":"2.0","id":4}"#).await.unwrap();
        assert_eq!(response.error.unwrap().code.0, -32600);
        assert_eq!(response.id, json!(4));

        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code.0, -32601);

        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"cash_flow","arguments":{}}}"#)
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code.0, -32602);
        assert_eq!(error.message, "Missing required argument: ticker");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server();
        assert!(
            server
                .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .await
                .is_none()
        );
        assert!(
            server
                .handle_message(r#"{"jsonrpc":"2.0","id":9,"result":{}}"#)
                .await
                .is_none()
        );
    }
}
