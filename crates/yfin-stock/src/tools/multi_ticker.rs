//! Batch lookup over several tickers

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use yfin_tools::{Error as ToolError, Result as ToolResult, Tool, schema};

use crate::accessor::StockTools;
use crate::api::MarketDataSource;
use crate::catalog::StockTool;

/// Registered name of the batch tool
pub const MULTI_TICKER_TOOL: &str = "run_spec_function_for_multiple_tickers";

#[derive(Debug, Deserialize)]
struct MultiTickerParams {
    tickers: Vec<String>,
    method: String,
}

/// Runs one stock lookup for each of several tickers
pub struct MultiTickerTool<S> {
    tools: StockTools<S>,
}

impl<S: MarketDataSource> MultiTickerTool<S> {
    pub fn new(tools: StockTools<S>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl<S: MarketDataSource + 'static> Tool for MultiTickerTool<S> {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: MultiTickerParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let reports = self
            .tools
            .run_for_multiple_tickers(&params.tickers, &params.method)
            .await?;

        // Map keeps insertion order (serde_json `preserve_order`)
        let reports: Map<String, Value> = reports
            .into_iter()
            .map(|(ticker, report)| (ticker, Value::String(report)))
            .collect();
        Ok(Value::Object(reports))
    }

    fn name(&self) -> &str {
        MULTI_TICKER_TOOL
    }

    fn description(&self) -> &str {
        "Run one of the stock functions for several tickers. \
         Returns a mapping of ticker to report, in the order the tickers were given."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "tickers": schema::array(schema::string(None), Some("Stock ticker symbols")),
                "method": schema::enum_string(&StockTool::names(), Some("Stock function to run")),
            }),
            &["tickers", "method"],
        )
    }
}
