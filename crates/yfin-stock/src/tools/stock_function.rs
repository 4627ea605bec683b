//! One stock lookup exposed as an in-process tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use yfin_tools::{Error as ToolError, Result as ToolResult, Tool};

use crate::accessor::StockTools;
use crate::api::MarketDataSource;
use crate::catalog::StockTool;

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

/// Tool wrapper around a single [`StockTool`]
pub struct StockFunctionTool<S> {
    tool: StockTool,
    tools: StockTools<S>,
}

impl<S: MarketDataSource> StockFunctionTool<S> {
    pub fn new(tool: StockTool, tools: StockTools<S>) -> Self {
        Self { tool, tools }
    }

    pub fn stock_tool(&self) -> StockTool {
        self.tool
    }
}

#[async_trait]
impl<S: MarketDataSource + 'static> Tool for StockFunctionTool<S> {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: TickerParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let report = self.tools.run(self.tool, &params.ticker).await?;
        Ok(Value::String(report))
    }

    fn name(&self) -> &str {
        self.tool.as_str()
    }

    fn description(&self) -> &str {
        self.tool.description()
    }

    fn input_schema(&self) -> Value {
        self.tool.input_schema()
    }
}
